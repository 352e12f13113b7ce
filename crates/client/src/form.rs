//! Create/edit form state and the dialogs that own it.
//!
//! [`InspectionForm`] holds exactly what the user typed. Before submitting,
//! it reports the first problem in the order entity, start date, end date,
//! authority, duration; the server repeats the full validation anyway.

use async_trait::async_trait;
use smp_core::error::FieldErrors;
use smp_core::inspection::{InspectionInput, FIELD_DURATION, FIELD_ORDER, FIELD_SMP, MSG_DURATION_REQUIRED};
use smp_core::types::{DbId, DATE_FORMAT};
use tokio::sync::OnceCell;

use crate::backend::{RegistryBackend, RegistryWriter};
use crate::driver::{LookupCommand, LookupHandle};
use crate::error::ClientError;
use crate::model::{AuthorityOption, InspectionRecord, SmpOption};
use crate::modal::ModalHandler;

// ---------------------------------------------------------------------------
// Form
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormMode {
    Create,
    Edit(InspectionRecord),
}

/// The first problem found in a form.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{field}: {message}")]
pub struct FormError {
    /// Internal field name, e.g. `plannedEndDate`.
    pub field: &'static str,
    pub message: String,
}

#[derive(Debug, thiserror::Error)]
pub enum SubmitError {
    #[error(transparent)]
    Invalid(#[from] FormError),

    #[error(transparent)]
    Client(#[from] ClientError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InspectionForm {
    pub mode: FormMode,
    pub smp_id: String,
    pub authority_id: String,
    pub planned_start_date: String,
    pub planned_end_date: String,
    pub planned_duration: String,
}

impl InspectionForm {
    pub fn create() -> Self {
        Self {
            mode: FormMode::Create,
            smp_id: String::new(),
            authority_id: String::new(),
            planned_start_date: String::new(),
            planned_end_date: String::new(),
            planned_duration: String::new(),
        }
    }

    /// A form pre-filled with `record`'s stored values.
    pub fn edit(record: InspectionRecord) -> Self {
        let values = stored_values(&record);
        Self {
            mode: FormMode::Edit(record),
            smp_id: values[0].clone(),
            authority_id: values[1].clone(),
            planned_start_date: values[2].clone(),
            planned_end_date: values[3].clone(),
            planned_duration: values[4].clone(),
        }
    }

    pub fn is_edit(&self) -> bool {
        matches!(self.mode, FormMode::Edit(_))
    }

    /// Dialog title and primary button label.
    pub fn labels(&self) -> (&'static str, &'static str) {
        if self.is_edit() {
            ("Edit inspection", "Update")
        } else {
            ("Add inspection", "Save")
        }
    }

    /// Report the first problem, in form order.
    pub fn validate(&self) -> Result<(), FormError> {
        let mut errors = match self.to_input().validate_new() {
            Ok(_) => FieldErrors::default(),
            Err(e) => e.field_errors().cloned().unwrap_or_default(),
        };
        if self.planned_duration.trim().is_empty() {
            errors.insert(FIELD_DURATION, MSG_DURATION_REQUIRED);
        }

        match FIELD_ORDER
            .iter()
            .find_map(|field| errors.get(field).map(|message| (*field, message)))
        {
            Some((field, message)) => Err(FormError {
                field,
                message: message.to_string(),
            }),
            None => Ok(()),
        }
    }

    /// Every field, blanks omitted.
    pub fn to_input(&self) -> InspectionInput {
        InspectionInput {
            smp_id: non_blank(&self.smp_id),
            authority_id: non_blank(&self.authority_id),
            planned_start_date: non_blank(&self.planned_start_date),
            planned_end_date: non_blank(&self.planned_end_date),
            planned_duration: non_blank(&self.planned_duration),
        }
    }

    /// Only the fields that differ from the record being edited.
    ///
    /// In create mode this is the same as [`to_input`](Self::to_input).
    pub fn changed_fields(&self) -> InspectionInput {
        let FormMode::Edit(record) = &self.mode else {
            return self.to_input();
        };
        let stored = stored_values(record);
        let changed = |current: &str, stored: &str| {
            let current = current.trim();
            (current != stored).then(|| current.to_string())
        };
        InspectionInput {
            smp_id: changed(&self.smp_id, &stored[0]),
            authority_id: changed(&self.authority_id, &stored[1]),
            planned_start_date: changed(&self.planned_start_date, &stored[2]),
            planned_end_date: changed(&self.planned_end_date, &stored[3]),
            planned_duration: changed(&self.planned_duration, &stored[4]),
        }
    }

    /// Validate, then create or update through `writer`.
    ///
    /// An edit that changes nothing returns the stored record without a
    /// request.
    pub async fn submit<W: RegistryWriter + ?Sized>(
        &self,
        writer: &W,
    ) -> Result<InspectionRecord, SubmitError> {
        self.validate()?;

        let record = match &self.mode {
            FormMode::Create => writer.create_inspection(&self.to_input()).await?,
            FormMode::Edit(record) => {
                let patch = self.changed_fields();
                if patch == InspectionInput::default() {
                    return Ok(record.clone());
                }
                writer.update_inspection(record.id, &patch).await?
            }
        };
        Ok(record)
    }
}

fn non_blank(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

/// Stored values of `record` as form text, in field order.
fn stored_values(record: &InspectionRecord) -> [String; 5] {
    [
        record.smp_id.to_string(),
        record.authority_id.to_string(),
        record.planned_start_date.format(DATE_FORMAT).to_string(),
        record.planned_end_date.format(DATE_FORMAT).to_string(),
        record.planned_duration.to_string(),
    ]
}

// ---------------------------------------------------------------------------
// Authority options
// ---------------------------------------------------------------------------

/// Authority choices, fetched on first use and kept for the session.
#[derive(Debug, Default)]
pub struct AuthorityOptions {
    cell: OnceCell<Vec<AuthorityOption>>,
}

impl AuthorityOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// The cached list, loading it first if needed. A failed load is not
    /// cached; the next call tries again.
    pub async fn get<B: RegistryBackend + ?Sized>(
        &self,
        backend: &B,
    ) -> Result<&[AuthorityOption], ClientError> {
        let list = self
            .cell
            .get_or_try_init(|| async {
                let list = backend.list_authorities().await;
                if let Err(e) = &list {
                    tracing::warn!(error = %e, "Failed to load control authorities");
                }
                list
            })
            .await?;
        Ok(list.as_slice())
    }
}

// ---------------------------------------------------------------------------
// Dialogs
// ---------------------------------------------------------------------------

/// State of the form and delete dialogs, driven by modal intents.
#[derive(Default)]
pub struct Dialogs {
    /// Open create/edit form, if any.
    pub form: Option<InspectionForm>,
    /// Record awaiting delete confirmation, if any.
    pub pending_delete: Option<InspectionRecord>,
    lookup: Option<LookupHandle>,
}

impl Dialogs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep the entity autocomplete in step with the form.
    pub fn with_lookup(mut self, lookup: LookupHandle) -> Self {
        self.lookup = Some(lookup);
        self
    }

    /// Submit the open form. On success the form closes; on failure it stays
    /// open with the user's input intact.
    pub async fn submit<W: RegistryWriter + ?Sized>(
        &mut self,
        writer: &W,
    ) -> Result<InspectionRecord, SubmitError> {
        let Some(form) = &self.form else {
            return Err(FormError {
                field: FIELD_SMP,
                message: "No form is open".to_string(),
            }
            .into());
        };
        let record = form.submit(writer).await?;
        tracing::info!(inspection_id = record.id, "Inspection saved");
        self.form = None;
        Ok(record)
    }

    /// Delete the record awaiting confirmation.
    ///
    /// Returns `Ok(None)` when nothing was pending.
    pub async fn confirm_delete<W: RegistryWriter + ?Sized>(
        &mut self,
        writer: &W,
    ) -> Result<Option<DbId>, ClientError> {
        let Some(record) = &self.pending_delete else {
            return Ok(None);
        };
        let deleted = writer.delete_inspection(record.id).await?;
        tracing::info!(inspection_id = deleted, "Inspection deleted");
        self.pending_delete = None;
        Ok(Some(deleted))
    }

    pub fn close(&mut self) {
        self.form = None;
        self.pending_delete = None;
    }

    async fn tell_lookup(&self, command: LookupCommand) {
        if let Some(lookup) = &self.lookup {
            if let Err(e) = lookup.send(command).await {
                tracing::warn!(error = %e, "Entity lookup unavailable");
            }
        }
    }
}

#[async_trait]
impl ModalHandler for Dialogs {
    async fn on_create(&mut self) {
        self.form = Some(InspectionForm::create());
        self.tell_lookup(LookupCommand::Reset).await;
    }

    async fn on_edit(&mut self, record: InspectionRecord) {
        let preset = record.smp_name.clone().map(|name_smp| SmpOption {
            id: record.smp_id,
            name_smp,
        });
        self.form = Some(InspectionForm::edit(record));
        if let Some(option) = preset {
            self.tell_lookup(LookupCommand::Preset(option)).await;
        }
    }

    async fn on_delete(&mut self, record: InspectionRecord) {
        self.pending_delete = Some(record);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use assert_matches::assert_matches;
    use smp_core::inspection::{
        FIELD_END, FIELD_START, MSG_END_BEFORE_START, MSG_SMP_REQUIRED, MSG_START_REQUIRED,
    };
    use smp_core::pagination::{LookupPage, PageResult};
    use smp_core::query::InspectionQuery;

    use super::*;
    use crate::coordinator::tests::record;

    fn filled() -> InspectionForm {
        InspectionForm {
            smp_id: "1".into(),
            authority_id: "2".into(),
            planned_start_date: "2025-01-01".into(),
            planned_end_date: "2025-01-05".into(),
            planned_duration: "4".into(),
            ..InspectionForm::create()
        }
    }

    #[test]
    fn empty_form_reports_entity_first() {
        let err = InspectionForm::create().validate().unwrap_err();
        assert_eq!(err.field, FIELD_SMP);
        assert_eq!(err.message, MSG_SMP_REQUIRED);
    }

    #[test]
    fn errors_follow_form_order() {
        let mut form = filled();
        form.planned_start_date.clear();
        form.authority_id.clear();
        let err = form.validate().unwrap_err();
        assert_eq!((err.field, err.message.as_str()), (FIELD_START, MSG_START_REQUIRED));

        let mut form = filled();
        form.planned_end_date = "2024-12-31".into();
        form.planned_duration.clear();
        let err = form.validate().unwrap_err();
        assert_eq!((err.field, err.message.as_str()), (FIELD_END, MSG_END_BEFORE_START));
    }

    #[test]
    fn duration_is_required_in_the_form() {
        let mut form = filled();
        form.planned_duration = "  ".into();
        let err = form.validate().unwrap_err();
        assert_eq!((err.field, err.message.as_str()), (FIELD_DURATION, MSG_DURATION_REQUIRED));

        form.planned_duration = "400".into();
        assert_eq!(form.validate().unwrap_err().field, FIELD_DURATION);
    }

    #[test]
    fn complete_form_is_valid() {
        assert_eq!(filled().validate(), Ok(()));
    }

    #[test]
    fn edit_sends_only_changed_fields() {
        let mut form = InspectionForm::edit(record(7, 1, "Ромашка ООО"));
        assert!(form.is_edit());
        assert_eq!(form.planned_start_date, "2025-01-01");

        form.planned_end_date = "2025-01-10".into();
        assert_eq!(
            form.changed_fields(),
            InspectionInput {
                planned_end_date: Some("2025-01-10".into()),
                ..InspectionInput::default()
            }
        );
    }

    #[derive(Default)]
    struct Writer {
        created: Mutex<Vec<InspectionInput>>,
        updated: Mutex<Vec<(DbId, InspectionInput)>>,
        deleted: Mutex<Vec<DbId>>,
    }

    #[async_trait]
    impl RegistryWriter for Writer {
        async fn create_inspection(&self, input: &InspectionInput) -> Result<InspectionRecord, ClientError> {
            self.created.lock().unwrap().push(input.clone());
            Ok(record(10, 1, "Ромашка ООО"))
        }

        async fn update_inspection(
            &self,
            id: DbId,
            input: &InspectionInput,
        ) -> Result<InspectionRecord, ClientError> {
            self.updated.lock().unwrap().push((id, input.clone()));
            Ok(record(id, 1, "Ромашка ООО"))
        }

        async fn delete_inspection(&self, id: DbId) -> Result<DbId, ClientError> {
            self.deleted.lock().unwrap().push(id);
            if id == 404 {
                return Err(ClientError::Api {
                    status: 404,
                    message: "Inspection with id 404 not found".into(),
                });
            }
            Ok(id)
        }
    }

    #[tokio::test]
    async fn invalid_form_sends_nothing() {
        let writer = Writer::default();
        let err = InspectionForm::create().submit(&writer).await.unwrap_err();
        assert_matches!(err, SubmitError::Invalid(FormError { field: FIELD_SMP, .. }));
        assert!(writer.created.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn unchanged_edit_sends_nothing() {
        let writer = Writer::default();
        let stored = record(7, 1, "Ромашка ООО");
        let saved = InspectionForm::edit(stored.clone()).submit(&writer).await.unwrap();
        assert_eq!(saved, stored);
        assert!(writer.updated.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn dialogs_follow_modal_intents() {
        let writer = Writer::default();
        let mut dialogs = Dialogs::new();

        dialogs.on_create().await;
        dialogs.form = Some(filled());
        let created = dialogs.submit(&writer).await.unwrap();
        assert_eq!(created.id, 10);
        assert!(dialogs.form.is_none());
        assert_eq!(writer.created.lock().unwrap().len(), 1);

        dialogs.on_edit(record(7, 1, "Ромашка ООО")).await;
        if let Some(form) = dialogs.form.as_mut() {
            form.planned_duration = "3".into();
        }
        dialogs.submit(&writer).await.unwrap();
        let updated = writer.updated.lock().unwrap().clone();
        assert_eq!(updated[0].0, 7);
        assert_eq!(updated[0].1.planned_duration.as_deref(), Some("3"));

        dialogs.on_delete(record(404, 1, "Ромашка ООО")).await;
        assert_matches!(dialogs.confirm_delete(&writer).await, Err(ClientError::Api { status: 404, .. }));
        assert!(dialogs.pending_delete.is_some());

        dialogs.on_delete(record(8, 1, "Ромашка ООО")).await;
        assert_eq!(dialogs.confirm_delete(&writer).await.unwrap(), Some(8));
        assert_eq!(dialogs.confirm_delete(&writer).await.unwrap(), None);
    }

    struct Authorities {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl RegistryBackend for Authorities {
        async fn search(&self, _: &InspectionQuery) -> Result<PageResult<InspectionRecord>, ClientError> {
            Err(ClientError::Decode("unused".into()))
        }

        async fn lookup_smp(&self, _: &str, _: i64) -> Result<LookupPage<SmpOption>, ClientError> {
            Err(ClientError::Decode("unused".into()))
        }

        async fn list_authorities(&self) -> Result<Vec<AuthorityOption>, ClientError> {
            if self.calls.fetch_add(1, Ordering::SeqCst) == 0 {
                return Err(ClientError::Decode("first call fails".into()));
            }
            Ok(vec![AuthorityOption {
                id: 1,
                name_authority: "ФНС России".into(),
            }])
        }
    }

    #[tokio::test]
    async fn authorities_load_once_after_success() {
        let backend = Authorities {
            calls: AtomicUsize::new(0),
        };
        let options = AuthorityOptions::new();

        assert!(options.get(&backend).await.is_err());
        assert_eq!(options.get(&backend).await.unwrap().len(), 1);
        assert_eq!(options.get(&backend).await.unwrap()[0].name_authority, "ФНС России");
        assert_eq!(backend.calls.load(Ordering::SeqCst), 2);
    }
}
