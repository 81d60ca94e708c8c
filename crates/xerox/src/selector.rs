//! Selection of the documents to send to Xerox for a set of day routes.

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use tracing::debug;

use etd_core::{BatchPickingId, DomainResult, RouteId};

use crate::collaborators::{DocumentPredicates, RecordStore};
use crate::model::{BatchPicking, Invoice, Picking, PickingKind, Route, TransmissionSet};
use crate::settings::XeroxSettings;

/// Flags of one send run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendOptions {
    /// Include already signed documents and routes without shipping documents.
    pub force: bool,
    /// Liquidation run: only liquidation-class invoices are sent.
    pub liquidation: bool,
}

impl SendOptions {
    pub fn forced() -> Self {
        Self {
            force: true,
            ..Self::default()
        }
    }
}

/// Documents linked to a route set, with the derived counters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShippingDocuments {
    pub invoices: Vec<Invoice>,
    pub pickings: Vec<Picking>,
    pub batches: Vec<BatchPicking>,
    /// Documents pending Xerox signing.
    pub pending_sign_count: usize,
    /// Documents travelling with the truck. Presale lots have some, route
    /// closing lots have none.
    pub shipping_docs_count: usize,
}

impl ShippingDocuments {
    pub fn has_shipping_docs(&self) -> bool {
        self.shipping_docs_count > 0
    }
}

/// Finds the invoices, pickings and batch pickings to transmit.
#[derive(Debug, Clone)]
pub struct DocumentSelector<S, P> {
    store: S,
    predicates: P,
    settings: XeroxSettings,
}

impl<S, P> DocumentSelector<S, P>
where
    S: RecordStore,
    P: DocumentPredicates,
{
    pub fn new(store: S, predicates: P, settings: XeroxSettings) -> Self {
        Self {
            store,
            predicates,
            settings,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn settings(&self) -> &XeroxSettings {
        &self.settings
    }

    /// Documents linked to `routes`, regardless of their document date.
    pub fn shipping_documents(
        &self,
        routes: &[Route],
        force: bool,
    ) -> DomainResult<ShippingDocuments> {
        let route_ids: Vec<RouteId> = routes.iter().map(|r| r.id).collect();

        let invoice_filter = self.predicates.invoice_filter(force, &route_ids)?;
        let invoices = self.store.search_invoices(&invoice_filter)?;

        let picking_filter = self.predicates.picking_filter(force, &route_ids, None)?;
        let pickings = self.store.search_pickings(&picking_filter)?;

        let batches = self.loading_batches(&route_ids, force)?;

        let trucking = invoices
            .iter()
            .filter(|inv| inv.has_class_in(&self.settings.trucking_classes))
            .count();

        let pending_sign_count = invoices.len() + pickings.len() + batches.len();
        let shipping_docs_count = trucking + pickings.len() + batches.len();

        debug!(
            routes = routes.len(),
            force,
            invoices = invoices.len(),
            pickings = pickings.len(),
            batches = batches.len(),
            pending_sign_count,
            shipping_docs_count,
            "computed shipping documents"
        );

        Ok(ShippingDocuments {
            invoices,
            pickings,
            batches,
            pending_sign_count,
            shipping_docs_count,
        })
    }

    /// Per-route documents and counters.
    pub fn route_documents(&self, route: &Route, force: bool) -> DomainResult<ShippingDocuments> {
        self.shipping_documents(core::slice::from_ref(route), force)
    }

    /// Batch pickings of the truck loading operations ("internal" pickings).
    fn loading_batches(
        &self,
        route_ids: &[RouteId],
        force: bool,
    ) -> DomainResult<Vec<BatchPicking>> {
        let load_filter =
            self.predicates
                .picking_filter(force, route_ids, Some(PickingKind::Internal))?;
        let load_pickings = self.store.search_pickings(&load_filter)?;

        let candidates: IndexSet<BatchPickingId> =
            load_pickings.iter().filter_map(|p| p.batch_id).collect();
        let candidates: Vec<BatchPickingId> = candidates.into_iter().collect();

        let batch_filter = self.predicates.batch_filter(force, &candidates)?;
        self.store.search_batches(&batch_filter)
    }

    /// Records to transmit for `routes`, keyed by entity kind.
    ///
    /// Without `force`, only routes that have shipping documents are listed.
    /// Eligibility is judged per route: a route without documents of its own
    /// is not listed because a sibling route has some.
    /// Documents are the union of every input route's documents either way.
    pub fn select_for_send(
        &self,
        routes: &[Route],
        options: SendOptions,
    ) -> DomainResult<TransmissionSet> {
        let mut set = TransmissionSet::default();

        for route in routes {
            let docs = self.route_documents(route, options.force)?;

            if options.force || docs.has_shipping_docs() {
                set.routes.insert(route.id);
            }

            let invoices = docs.invoices.iter().filter(|inv| {
                !options.liquidation || inv.document_class == Some(self.settings.liquidation_class)
            });
            set.invoices.extend(invoices.map(|inv| inv.id));
            set.pickings.extend(docs.pickings.iter().map(|p| p.id));
            set.batches.extend(docs.batches.iter().map(|b| b.id));
        }

        debug!(
            routes = set.routes.len(),
            invoices = set.invoices.len(),
            pickings = set.pickings.len(),
            batches = set.batches.len(),
            force = options.force,
            liquidation = options.liquidation,
            "selected records for xerox"
        );

        Ok(set)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collaborators::{Filter, SigningPredicates};
    use crate::testing::VecStore;
    use etd_core::{CompanyId, DomainError};
    use proptest::prelude::*;

    fn selector(store: VecStore) -> DocumentSelector<VecStore, SigningPredicates> {
        DocumentSelector::new(store, SigningPredicates, XeroxSettings::default())
    }

    #[test]
    fn route_without_documents_has_zero_counters() {
        let mut store = VecStore::default();
        let route = store.add_route(CompanyId::new());

        let docs = selector(store).route_documents(&route, false).unwrap();
        assert_eq!(docs.pending_sign_count, 0);
        assert_eq!(docs.shipping_docs_count, 0);
        assert!(!docs.has_shipping_docs());
    }

    #[test]
    fn only_trucking_invoices_count_as_shipping_documents() {
        let mut store = VecStore::default();
        let route = store.add_route(CompanyId::new());
        store.add_invoice(&route, 33);
        store.add_invoice(&route, 39);
        store.add_invoice(&route, 61);
        store.add_invoice(&route, 52);

        let docs = selector(store).route_documents(&route, false).unwrap();
        assert_eq!(docs.invoices.len(), 4);
        assert_eq!(docs.pending_sign_count, 4);
        assert_eq!(docs.shipping_docs_count, 2);
    }

    #[test]
    fn pickings_and_batches_always_count() {
        let mut store = VecStore::default();
        let company = CompanyId::new();
        let (route, _loading) = store.add_loaded_route(company);
        store.add_picking(&route, PickingKind::Outgoing, None);
        store.add_invoice(&route, 61);

        let docs = selector(store).route_documents(&route, false).unwrap();
        assert_eq!(docs.pickings.len(), 1);
        assert_eq!(docs.batches.len(), 1);
        assert_eq!(docs.pending_sign_count, 3);
        assert_eq!(docs.shipping_docs_count, 2);
    }

    #[test]
    fn batches_come_only_from_loading_pickings() {
        let mut store = VecStore::default();
        let company = CompanyId::new();
        let route = store.add_route(company);
        let batch = store.add_batch(company);
        // Delivery picking grouped in a batch: not a loading operation.
        store.add_picking(&route, PickingKind::Outgoing, Some(batch.id));

        let docs = selector(store).route_documents(&route, false).unwrap();
        assert!(docs.batches.is_empty());
        assert_eq!(docs.pickings.len(), 1);
    }

    #[test]
    fn batch_shared_by_loading_pickings_is_listed_once() {
        let mut store = VecStore::default();
        let company = CompanyId::new();
        let (route, loading) = store.add_loaded_route(company);
        store.add_picking(&route, PickingKind::Internal, loading.batch_id);

        let docs = selector(store).route_documents(&route, false).unwrap();
        assert_eq!(docs.batches.len(), 1);
    }

    #[test]
    fn force_selects_signed_documents() {
        let mut store = VecStore::default();
        let route = store.add_route(CompanyId::new());
        store.add_invoice(&route, 33);
        store.invoices[0].signed = true;

        let sel = selector(store);
        assert_eq!(sel.route_documents(&route, false).unwrap().pending_sign_count, 0);
        assert_eq!(sel.route_documents(&route, true).unwrap().pending_sign_count, 1);
    }

    #[test]
    fn select_without_force_skips_routes_without_shipping_documents() {
        let mut store = VecStore::default();
        let company = CompanyId::new();
        let presale = store.add_route(company);
        let closing = store.add_route(company);
        let presale_invoice = store.add_invoice(&presale, 33);
        let closing_invoice = store.add_invoice(&closing, 61);

        let set = selector(store)
            .select_for_send(&[presale.clone(), closing.clone()], SendOptions::default())
            .unwrap();

        assert_eq!(set.routes.iter().copied().collect::<Vec<_>>(), vec![presale.id]);
        // Documents of every input route pass through.
        assert_eq!(
            set.invoices.iter().copied().collect::<Vec<_>>(),
            vec![presale_invoice.id, closing_invoice.id]
        );
    }

    #[test]
    fn select_with_force_keeps_every_route() {
        let mut store = VecStore::default();
        let company = CompanyId::new();
        let presale = store.add_route(company);
        let closing = store.add_route(company);
        store.add_invoice(&presale, 33);

        let set = selector(store)
            .select_for_send(&[presale.clone(), closing.clone()], SendOptions::forced())
            .unwrap();

        assert_eq!(
            set.routes.iter().copied().collect::<Vec<_>>(),
            vec![presale.id, closing.id]
        );
    }

    #[test]
    fn liquidation_narrows_invoices_to_class_61() {
        let mut store = VecStore::default();
        let route = store.add_route(CompanyId::new());
        store.add_invoice(&route, 33);
        let liquidation = store.add_invoice(&route, 61);
        store.add_invoice(&route, 39);
        let sel = selector(store);

        let normal = sel
            .select_for_send(std::slice::from_ref(&route), SendOptions::default())
            .unwrap();
        assert_eq!(normal.invoices.len(), 3);

        let options = SendOptions {
            liquidation: true,
            ..SendOptions::default()
        };
        let narrowed = sel.select_for_send(std::slice::from_ref(&route), options).unwrap();
        assert_eq!(
            narrowed.invoices.iter().copied().collect::<Vec<_>>(),
            vec![liquidation.id]
        );
        // Route eligibility still uses the trucking count.
        assert_eq!(narrowed.routes.len(), 1);
    }

    struct FailingPredicates;

    impl DocumentPredicates for FailingPredicates {
        fn invoice_filter(
            &self,
            _force: bool,
            _routes: &[RouteId],
        ) -> anyhow::Result<Filter<Invoice>> {
            Err(anyhow::anyhow!("document date range not configured"))
        }

        fn picking_filter(
            &self,
            _force: bool,
            _routes: &[RouteId],
            _kind: Option<PickingKind>,
        ) -> anyhow::Result<Filter<Picking>> {
            Ok(Filter::all())
        }

        fn batch_filter(
            &self,
            _force: bool,
            _batches: &[BatchPickingId],
        ) -> anyhow::Result<Filter<BatchPicking>> {
            Ok(Filter::all())
        }
    }

    #[test]
    fn predicate_errors_propagate_unmodified() {
        let mut store = VecStore::default();
        let route = store.add_route(CompanyId::new());
        let sel = DocumentSelector::new(store, FailingPredicates, XeroxSettings::default());

        let err = sel.route_documents(&route, false).unwrap_err();
        assert!(matches!(err, DomainError::External(_)));
        assert_eq!(err.to_string(), "document date range not configured");
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 128,
            ..ProptestConfig::default()
        })]

        /// Property: the shipping count never exceeds the pending count.
        #[test]
        fn shipping_count_bounded_by_pending_count(
            classes in prop::collection::vec(
                prop::sample::select(vec![33u16, 39, 52, 56, 61]),
                0..8,
            ),
            deliveries in 0usize..4,
            loads in 0usize..3,
            force in any::<bool>(),
        ) {
            let mut store = VecStore::default();
            let company = CompanyId::new();
            let route = store.add_route(company);
            for class in &classes {
                store.add_invoice(&route, *class);
            }
            for _ in 0..deliveries {
                store.add_picking(&route, PickingKind::Outgoing, None);
            }
            for _ in 0..loads {
                let batch = store.add_batch(company);
                store.add_picking(&route, PickingKind::Internal, Some(batch.id));
            }

            let docs = selector(store).route_documents(&route, force).unwrap();
            prop_assert!(docs.shipping_docs_count <= docs.pending_sign_count);
            prop_assert_eq!(docs.pending_sign_count, classes.len() + deliveries + loads);
        }
    }
}
