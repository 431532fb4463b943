//! Category-scoped attribute form synchronizer.
//!
//! Holds the catalog, the category the form is bound to, and the value map
//! for that category. Every successful bind or edit publishes a full snapshot
//! of the map to the host callback and to watch subscribers.
//!
//! Invariant: the keys of the value map are exactly the names of the catalog
//! definitions whose category matches the bound category.

use parking_lot::Mutex;
use tokio::sync::watch;

use crate::catalog::CatalogSource;
use crate::types::{AttributeDefinition, AttributeOption, Catalog, CategoryId, FieldValue, FormValues};

/// Host notification, called with the full map after every change.
pub type ChangeCallback = Box<dyn Fn(&FormValues) + Send + Sync>;

/// Identifies one binding of the form. A rebind (or catalog reload) starts a
/// new binding; edits carrying an older one are discarded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binding {
    pub category: CategoryId,
    generation: u64,
}

impl Binding {
    /// Counter value identifying this binding. Unique for the form's lifetime,
    /// so hosts that cannot hold a `Binding` can pass this number back.
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// What happened to an edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditOutcome {
    Applied,
    /// The name is not a field of the bound category.
    UnknownField,
    /// The edit was issued against a binding that has since been replaced.
    StaleBinding,
    /// No category is bound yet.
    NotBound,
    /// Toggle on a field that is not a checkbox.
    NotAFlag,
    /// A text value for a checkbox, or a flag for a text field.
    WrongType,
    /// The form was closed.
    Closed,
}

impl EditOutcome {
    pub fn is_applied(self) -> bool {
        self == EditOutcome::Applied
    }
}

#[derive(Default)]
struct FormState {
    /// `None` until the first fetch resolves.
    catalog: Option<Catalog>,
    /// Latest category the host asked for.
    requested: Option<CategoryId>,
    bound: Option<CategoryId>,
    values: FormValues,
    generation: u64,
    /// Sequence number of the most recent fetch; older responses are dropped.
    load_seq: u64,
    loading: bool,
    closed: bool,
}

impl FormState {
    /// Rebuild the map for `category`. Returns the snapshot to publish, or
    /// `None` when the bind is a no-op.
    fn bind(&mut self, category: CategoryId) -> Option<FormValues> {
        let catalog = self.catalog.as_ref().filter(|c| !c.is_empty())?;
        if self.bound.as_ref() == Some(&category) {
            return None;
        }

        let values: FormValues = catalog
            .for_category(&category)
            .map(|def| (def.name.clone(), def.kind.initial_value()))
            .collect();
        tracing::debug!(category = %category, fields = values.len(), "bound attribute form");

        self.values = values.clone();
        self.bound = Some(category);
        self.generation += 1;
        Some(values)
    }

    fn binding(&self) -> Option<Binding> {
        self.bound.as_ref().map(|category| Binding {
            category: category.clone(),
            generation: self.generation,
        })
    }

    fn edit(
        &mut self,
        name: &str,
        apply: impl FnOnce(&mut FieldValue) -> Result<(), EditOutcome>,
    ) -> Result<FormValues, EditOutcome> {
        if self.closed {
            return Err(EditOutcome::Closed);
        }
        if self.bound.is_none() {
            return Err(EditOutcome::NotBound);
        }
        let Some(slot) = self.values.get_mut(name) else {
            tracing::debug!(field = name, "ignoring edit to a field outside the bound category");
            return Err(EditOutcome::UnknownField);
        };
        apply(slot)?;
        Ok(self.values.clone())
    }
}

/// Replace a field's value, keeping its kind.
fn assign(slot: &mut FieldValue, value: FieldValue) -> Result<(), EditOutcome> {
    if std::mem::discriminant(slot) != std::mem::discriminant(&value) {
        return Err(EditOutcome::WrongType);
    }
    *slot = value;
    Ok(())
}

/// Resets `loading` when a load ends, including when its future is dropped
/// mid-fetch. A newer load owns the flag and is left alone.
struct LoadGuard<'a> {
    state: &'a Mutex<FormState>,
    seq: u64,
}

impl Drop for LoadGuard<'_> {
    fn drop(&mut self) {
        let mut state = self.state.lock();
        if state.load_seq == self.seq {
            state.loading = false;
        }
    }
}

/// Synchronizes a dynamic attribute form with the selected product category.
pub struct AttributeForm {
    state: Mutex<FormState>,
    on_change: ChangeCallback,
    updates: watch::Sender<FormValues>,
}

impl AttributeForm {
    pub fn new(on_change: impl Fn(&FormValues) + Send + Sync + 'static) -> Self {
        let (updates, _) = watch::channel(FormValues::new());
        Self {
            state: Mutex::new(FormState::default()),
            on_change: Box::new(on_change),
            updates,
        }
    }

    /// Fetch the catalog and apply it.
    ///
    /// Fetch errors degrade to an empty catalog. If the form is closed, or a
    /// newer load was started while this one was in flight, the response is
    /// dropped. After applying, the form binds to the category the host most
    /// recently requested.
    pub async fn load_catalog(&self, source: &dyn CatalogSource) {
        let seq = {
            let mut state = self.state.lock();
            if state.closed {
                return;
            }
            state.load_seq += 1;
            state.loading = true;
            state.load_seq
        };
        let _guard = LoadGuard {
            state: &self.state,
            seq,
        };

        let result = source.fetch_catalog().await;

        let published = {
            let mut state = self.state.lock();
            if state.closed || state.load_seq != seq {
                tracing::debug!("discarding superseded catalog response");
                return;
            }
            state.loading = false;

            let catalog = match result {
                Ok(catalog) => catalog,
                Err(err) => {
                    tracing::warn!(error = %err, "attribute catalog unavailable; showing no fields");
                    Catalog::default()
                }
            };
            tracing::debug!(definitions = catalog.definitions.len(), "attribute catalog loaded");

            let was_bound = state.bound.take().is_some();
            state.catalog = Some(catalog);
            match state.requested.clone() {
                Some(category) => state.bind(category),
                None => None,
            }
            .or_else(|| {
                // Nothing to bind against the new catalog; drop the old fields.
                was_bound.then(|| {
                    state.values.clear();
                    state.generation += 1;
                    FormValues::new()
                })
            })
        };

        if let Some(values) = published {
            self.publish(values);
        }
    }

    /// Bind the form to `category`, rebuilding the value map.
    ///
    /// No-op (returns `false`) when `category` is absent or empty, when the
    /// catalog is not loaded or empty, or when it is already bound. The request
    /// is remembered either way, so a catalog arriving later binds to it.
    pub fn bind_category(&self, category: Option<CategoryId>) -> bool {
        let category = category.and_then(CategoryId::non_empty);
        let published = {
            let mut state = self.state.lock();
            if state.closed {
                return false;
            }
            state.requested = category.clone();
            match category {
                Some(category) => state.bind(category),
                None => None,
            }
        };

        match published {
            Some(values) => {
                self.publish(values);
                true
            }
            None => false,
        }
    }

    /// Set one field of the bound category.
    pub fn set_value(&self, name: &str, value: impl Into<FieldValue>) -> EditOutcome {
        let value = value.into();
        let result = self.state.lock().edit(name, |slot| assign(slot, value));
        self.finish_edit(result)
    }

    /// Set one field, but only if `binding` is still the current binding.
    pub fn set_value_for(
        &self,
        binding: &Binding,
        name: &str,
        value: impl Into<FieldValue>,
    ) -> EditOutcome {
        self.set_value_at(binding.generation, name, value)
    }

    /// [`Self::set_value_for`] keyed by [`Binding::generation`].
    pub fn set_value_at(
        &self,
        generation: u64,
        name: &str,
        value: impl Into<FieldValue>,
    ) -> EditOutcome {
        let value = value.into();
        let result = {
            let mut state = self.state.lock();
            if !state.closed && state.bound.is_some() && state.generation != generation {
                tracing::debug!(
                    generation,
                    current = state.generation,
                    "discarding edit for a replaced binding"
                );
                return EditOutcome::StaleBinding;
            }
            state.edit(name, |slot| assign(slot, value))
        };
        self.finish_edit(result)
    }

    /// Flip a checkbox field.
    pub fn toggle(&self, name: &str) -> EditOutcome {
        let result = self.state.lock().edit(name, |slot| match slot {
            FieldValue::Flag(flag) => {
                *flag = !*flag;
                Ok(())
            }
            FieldValue::Text(_) => Err(EditOutcome::NotAFlag),
        });
        self.finish_edit(result)
    }

    fn finish_edit(&self, result: Result<FormValues, EditOutcome>) -> EditOutcome {
        match result {
            Ok(values) => {
                self.publish(values);
                EditOutcome::Applied
            }
            Err(outcome) => outcome,
        }
    }

    fn publish(&self, values: FormValues) {
        (self.on_change)(&values);
        self.updates.send_replace(values);
    }

    /// Catalog definitions of the bound category, read from the current catalog.
    pub fn relevant_attributes(&self) -> Vec<AttributeDefinition> {
        let state = self.state.lock();
        match (&state.catalog, &state.bound) {
            (Some(catalog), Some(category)) => catalog.for_category(category).cloned().collect(),
            _ => Vec::new(),
        }
    }

    /// Dropdown options for one attribute.
    pub fn options_for(&self, attribute_id: u64) -> Vec<AttributeOption> {
        self.state
            .lock()
            .catalog
            .as_ref()
            .map(|catalog| catalog.options_for(attribute_id))
            .unwrap_or_default()
    }

    /// Snapshot of the current value map.
    pub fn values(&self) -> FormValues {
        self.state.lock().values.clone()
    }

    pub fn bound_category(&self) -> Option<CategoryId> {
        self.state.lock().bound.clone()
    }

    pub fn binding(&self) -> Option<Binding> {
        self.state.lock().binding()
    }

    pub fn is_loading(&self) -> bool {
        self.state.lock().loading
    }

    pub fn is_catalog_loaded(&self) -> bool {
        self.state.lock().catalog.is_some()
    }

    /// Receive every published snapshot.
    pub fn subscribe(&self) -> watch::Receiver<FormValues> {
        self.updates.subscribe()
    }

    /// Tear the form down. In-flight catalog responses are dropped and all
    /// later operations are no-ops.
    pub fn close(&self) {
        let mut state = self.state.lock();
        state.closed = true;
        state.loading = false;
    }

    pub fn is_closed(&self) -> bool {
        self.state.lock().closed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CatalogError;
    use crate::types::AttributeKind;
    use async_trait::async_trait;
    use std::sync::Arc;
    use tokio::sync::oneshot;

    struct FailingSource;

    #[async_trait(?Send)]
    impl CatalogSource for FailingSource {
        async fn fetch_catalog(&self) -> Result<Catalog, CatalogError> {
            Err(CatalogError::Status(500))
        }
    }

    /// Resolves only after the test opens the gate.
    struct GatedSource {
        gate: Mutex<Option<oneshot::Receiver<()>>>,
        catalog: Catalog,
    }

    impl GatedSource {
        fn new(catalog: Catalog) -> (Self, oneshot::Sender<()>) {
            let (tx, rx) = oneshot::channel();
            let source = Self {
                gate: Mutex::new(Some(rx)),
                catalog,
            };
            (source, tx)
        }
    }

    #[async_trait(?Send)]
    impl CatalogSource for GatedSource {
        async fn fetch_catalog(&self) -> Result<Catalog, CatalogError> {
            let gate = self.gate.lock().take();
            if let Some(gate) = gate {
                let _ = gate.await;
            }
            Ok(self.catalog.clone())
        }
    }

    fn catalog() -> Catalog {
        Catalog::new(vec![
            AttributeDefinition::new(1, "color", 10u64),
            AttributeDefinition::new(2, "size", 10u64),
            AttributeDefinition::new(3, "voltage", 20u64),
            AttributeDefinition::new(4, "laminated", 20u64).with_kind(AttributeKind::Checkbox),
        ])
    }

    fn recording_form() -> (AttributeForm, Arc<Mutex<Vec<FormValues>>>) {
        let log = Arc::new(Mutex::new(Vec::new()));
        let sink = log.clone();
        let form = AttributeForm::new(move |values| sink.lock().push(values.clone()));
        (form, log)
    }

    fn keys(values: &FormValues) -> Vec<&str> {
        values.keys().map(String::as_str).collect()
    }

    #[tokio::test]
    async fn bind_before_load_is_a_noop() {
        let (form, log) = recording_form();
        assert!(!form.bind_category(Some(10u64.into())));
        assert!(form.values().is_empty());
        assert!(form.bound_category().is_none());
        assert!(log.lock().is_empty());
    }

    #[tokio::test]
    async fn load_binds_to_pending_request() {
        let (form, log) = recording_form();
        form.bind_category(Some(10u64.into()));
        form.load_catalog(&catalog()).await;
        assert_eq!(keys(&form.values()), vec!["color", "size"]);
        assert_eq!(log.lock().len(), 1);
    }

    #[tokio::test]
    async fn load_uses_latest_request_not_first() {
        let (form, _) = recording_form();
        let (source, open) = GatedSource::new(catalog());
        let drive = async {
            tokio::task::yield_now().await;
            form.bind_category(Some(10u64.into()));
            form.bind_category(Some(20u64.into()));
            assert!(form.is_loading());
            open.send(()).unwrap();
        };
        tokio::join!(form.load_catalog(&source), drive);
        assert_eq!(form.bound_category(), Some(20u64.into()));
        assert_eq!(keys(&form.values()), vec!["laminated", "voltage"]);
        assert!(!form.is_loading());
    }

    #[tokio::test]
    async fn cleared_request_before_load_binds_nothing() {
        let (form, log) = recording_form();
        form.bind_category(Some(10u64.into()));
        form.bind_category(None);
        form.load_catalog(&catalog()).await;
        assert!(form.bound_category().is_none());
        assert!(log.lock().is_empty());
    }

    #[tokio::test]
    async fn fetch_failure_gives_empty_catalog() {
        let (form, log) = recording_form();
        form.load_catalog(&FailingSource).await;
        assert!(form.is_catalog_loaded());
        assert!(!form.bind_category(Some(10u64.into())));
        assert!(form.values().is_empty());
        assert!(form.relevant_attributes().is_empty());
        assert!(log.lock().is_empty());
    }

    #[tokio::test]
    async fn closed_form_discards_inflight_response() {
        let (form, log) = recording_form();
        form.bind_category(Some(10u64.into()));
        let (source, open) = GatedSource::new(catalog());
        let drive = async {
            tokio::task::yield_now().await;
            form.close();
            open.send(()).unwrap();
        };
        tokio::join!(form.load_catalog(&source), drive);
        assert!(!form.is_catalog_loaded());
        assert!(form.values().is_empty());
        assert!(log.lock().is_empty());
        assert_eq!(form.set_value("color", "red"), EditOutcome::Closed);
        assert!(!form.bind_category(Some(20u64.into())));
    }

    #[tokio::test]
    async fn superseded_load_is_dropped() {
        let (form, _) = recording_form();
        form.bind_category(Some(10u64.into()));
        let (slow, open) = GatedSource::new(catalog());
        let fresh = Catalog::new(vec![AttributeDefinition::new(9, "finish", 10u64)]);
        let drive = async {
            tokio::task::yield_now().await;
            form.load_catalog(&fresh).await;
            open.send(()).unwrap();
        };
        tokio::join!(form.load_catalog(&slow), drive);
        assert_eq!(keys(&form.values()), vec!["finish"]);
    }

    #[tokio::test]
    async fn reload_rebuilds_against_new_catalog() {
        let (form, log) = recording_form();
        form.load_catalog(&catalog()).await;
        form.bind_category(Some(10u64.into()));
        form.set_value("color", "red");
        let reloaded = Catalog::new(vec![
            AttributeDefinition::new(1, "color", 10u64),
            AttributeDefinition::new(5, "weight", 10u64),
        ]);
        form.load_catalog(&reloaded).await;
        assert_eq!(keys(&form.values()), vec!["color", "weight"]);
        assert_eq!(form.values()["color"], FieldValue::from(""));
        assert_eq!(log.lock().len(), 3);

        let names: Vec<String> = form
            .relevant_attributes()
            .into_iter()
            .map(|def| def.name)
            .collect();
        assert_eq!(names, vec!["color", "weight"]);
    }

    #[tokio::test]
    async fn dropped_load_clears_loading_flag() {
        let (form, _) = recording_form();
        let (source, _open) = GatedSource::new(catalog());
        tokio::select! {
            biased;
            _ = form.load_catalog(&source) => panic!("gated load completed"),
            _ = tokio::task::yield_now() => {}
        }
        assert!(!form.is_loading());
        assert!(!form.is_catalog_loaded());

        form.bind_category(Some(10u64.into()));
        form.load_catalog(&catalog()).await;
        assert!(!form.is_loading());
        assert_eq!(keys(&form.values()), vec!["color", "size"]);
    }

    #[tokio::test]
    async fn edit_keyed_by_old_generation_is_discarded_for_shared_field() {
        let (form, log) = recording_form();
        let shared = Catalog::new(vec![
            AttributeDefinition::new(1, "color", 10u64),
            AttributeDefinition::new(2, "color", 20u64),
        ]);
        form.load_catalog(&shared).await;
        form.bind_category(Some(10u64.into()));
        let old = form.binding().unwrap().generation();

        form.bind_category(Some(20u64.into()));
        assert_eq!(form.set_value_at(old, "color", "red"), EditOutcome::StaleBinding);
        assert_eq!(form.values()["color"], FieldValue::from(""));
        assert_eq!(log.lock().len(), 2);

        let current = form.binding().unwrap().generation();
        assert_ne!(current, old);
        assert!(form.set_value_at(current, "color", "blue").is_applied());
        assert_eq!(form.values()["color"], FieldValue::from("blue"));
    }

    #[tokio::test]
    async fn set_value_keeps_field_kind() {
        let (form, log) = recording_form();
        form.load_catalog(&catalog()).await;
        form.bind_category(Some(20u64.into()));
        assert_eq!(form.set_value("laminated", "yes"), EditOutcome::WrongType);
        assert_eq!(form.values()["laminated"], FieldValue::from(false));
        assert_eq!(form.set_value("voltage", true), EditOutcome::WrongType);
        assert_eq!(form.values()["voltage"], FieldValue::from(""));
        assert_eq!(log.lock().len(), 1);

        assert!(form.set_value("laminated", true).is_applied());
        assert_eq!(form.values()["laminated"], FieldValue::from(true));
    }

    #[tokio::test]
    async fn reload_to_empty_catalog_clears_fields() {
        let (form, log) = recording_form();
        form.load_catalog(&catalog()).await;
        form.bind_category(Some(10u64.into()));
        form.load_catalog(&FailingSource).await;
        assert!(form.values().is_empty());
        assert!(form.bound_category().is_none());
        assert!(log.lock().last().unwrap().is_empty());
    }

    #[tokio::test]
    async fn stale_binding_edits_are_discarded() {
        let (form, _) = recording_form();
        form.load_catalog(&catalog()).await;
        form.bind_category(Some(10u64.into()));
        let old = form.binding().unwrap();
        assert!(form.set_value_for(&old, "color", "red").is_applied());

        form.bind_category(Some(20u64.into()));
        assert_eq!(form.set_value_for(&old, "color", "blue"), EditOutcome::StaleBinding);
        assert_eq!(form.set_value_for(&old, "voltage", "220"), EditOutcome::StaleBinding);
        assert_eq!(form.values()["voltage"], FieldValue::from(""));

        let current = form.binding().unwrap();
        assert!(form.set_value_for(&current, "voltage", "220").is_applied());
    }

    #[tokio::test]
    async fn rebinding_same_category_keeps_binding() {
        let (form, _) = recording_form();
        form.load_catalog(&catalog()).await;
        form.bind_category(Some(10u64.into()));
        let binding = form.binding().unwrap();
        form.bind_category(Some("10".into()));
        assert_eq!(form.binding(), Some(binding));
    }

    #[tokio::test]
    async fn toggle_flips_checkboxes_only() {
        let (form, _) = recording_form();
        form.load_catalog(&catalog()).await;
        form.bind_category(Some(20u64.into()));
        assert_eq!(form.values()["laminated"], FieldValue::from(false));
        assert!(form.toggle("laminated").is_applied());
        assert_eq!(form.values()["laminated"], FieldValue::from(true));
        assert_eq!(form.toggle("voltage"), EditOutcome::NotAFlag);
        assert_eq!(form.toggle("color"), EditOutcome::UnknownField);
    }

    #[tokio::test]
    async fn edits_before_binding_are_rejected() {
        let (form, log) = recording_form();
        form.load_catalog(&catalog()).await;
        assert_eq!(form.set_value("color", "red"), EditOutcome::NotBound);
        assert!(log.lock().is_empty());
    }

    #[tokio::test]
    async fn subscribers_see_published_snapshots() {
        let (form, _) = recording_form();
        let mut rx = form.subscribe();
        form.load_catalog(&catalog()).await;
        form.bind_category(Some(10u64.into()));
        assert!(rx.has_changed().unwrap());
        assert_eq!(keys(&rx.borrow_and_update()), vec!["color", "size"]);
        form.set_value("size", "XL");
        assert_eq!(rx.borrow_and_update()["size"], FieldValue::from("XL"));
    }

    #[tokio::test]
    async fn options_come_from_catalog() {
        let (form, _) = recording_form();
        let with_options = catalog().with_options(vec![AttributeOption {
            id: 1,
            attribute: 2,
            value: "XL".into(),
        }]);
        assert!(form.options_for(2).is_empty());
        form.load_catalog(&with_options).await;
        assert_eq!(form.options_for(2)[0].value, "XL");
    }
}
