//! Options editing for an existing entry.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::{debug, info, info_span, Instrument};

use sc_core::config::FlowDefaults;
use sc_core::entry::ResolvedOptions;
use sc_core::form::{FormErrors, FormInput};
use sc_core::ids::{EntryId, FlowId};
use sc_core::ports::ConfigEntryPort;
use sc_core::setup::{forms, FlowResult, StepId};

use crate::error::FlowError;

/// Single-step options form.
///
/// Each field is pre-filled from the options overlay, then the entry data,
/// then the flow defaults. A submission replaces the overlay wholesale.
pub struct OptionsFlow {
    flow_id: FlowId,
    entry_id: EntryId,
    defaults: Arc<FlowDefaults>,
    entries: Arc<dyn ConfigEntryPort>,
    finished: AtomicBool,
}

impl OptionsFlow {
    pub fn new(
        flow_id: FlowId,
        entry_id: EntryId,
        defaults: Arc<FlowDefaults>,
        entries: Arc<dyn ConfigEntryPort>,
    ) -> Self {
        Self {
            flow_id,
            entry_id,
            defaults,
            entries,
            finished: AtomicBool::new(false),
        }
    }

    pub fn flow_id(&self) -> &FlowId {
        &self.flow_id
    }

    pub async fn configure(&self, input: Option<FormInput>) -> Result<FlowResult, FlowError> {
        if self.finished.load(Ordering::SeqCst) {
            return Err(FlowError::Finished);
        }

        let span = info_span!(
            "usecase.options_flow.configure",
            flow_id = %self.flow_id,
            entry_id = %self.entry_id
        );
        async {
            let entry = self
                .entries
                .get_entry(&self.entry_id)
                .await?
                .ok_or_else(|| FlowError::EntryNotFound(self.entry_id.clone()))?;
            debug!(options = ?entry.options, "current entry options");

            let resolved = ResolvedOptions::resolve(&entry, &self.defaults);
            let schema = forms::options_form(&resolved);

            let Some(input) = input else {
                return Ok(FlowResult::ShowForm {
                    step_id: StepId::User,
                    schema,
                    errors: FormErrors::new(),
                });
            };

            let values = match schema.validate(&input) {
                Ok(values) => values,
                Err(errors) => {
                    return Ok(FlowResult::ShowForm {
                        step_id: StepId::User,
                        schema,
                        errors,
                    })
                }
            };

            let options = forms::overlay_from_values(&values);
            let saved = self.entries.set_options(&entry.entry_id, options).await?;
            info!("entry options saved");
            self.finished.store(true, Ordering::SeqCst);

            Ok(FlowResult::OptionsSaved {
                entry_id: saved.entry_id,
                options: saved.options,
            })
        }
        .instrument(span)
        .await
    }
}
