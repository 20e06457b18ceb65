mod support;

use std::sync::Arc;

use sc_app::{FlowError, OptionsFlow};
use sc_core::config::FlowDefaults;
use sc_core::entry::{ConvertUnit, EntryData, OptionsOverlay};
use sc_core::form::{FieldKey, FieldValue, FormInput};
use sc_core::ids::{EntryId, FlowId};
use sc_core::ports::ConfigEntryPort;
use sc_core::security::SecretString;
use sc_core::setup::{FlowResult, StepId};

use support::{stored_data, Harness, VIN1};

fn options_flow(harness: &Harness, entry_id: EntryId, defaults: FlowDefaults) -> OptionsFlow {
    OptionsFlow::new(
        FlowId::new(),
        entry_id,
        Arc::new(defaults),
        harness.entries.clone(),
    )
}

fn default_of(result: &FlowResult, key: FieldKey) -> FieldValue {
    let FlowResult::ShowForm { schema, .. } = result else {
        panic!("expected the options form, got {result:?}");
    };
    schema
        .field(key)
        .and_then(|field| field.default.clone())
        .unwrap_or_else(|| panic!("{key} has no default"))
}

fn bare_data() -> EntryData {
    EntryData {
        update_interval: None,
        spin: None,
        debug: None,
        mutable: None,
        convert: None,
        ..stored_data(VIN1)
    }
}

#[tokio::test]
async fn form_prefers_overlay_then_entry_data_then_defaults() {
    let harness = Harness::new([]);
    let data = EntryData {
        update_interval: Some(10),
        convert: Some(ConvertUnit::ImperialUnits),
        ..bare_data()
    };
    let entry = harness.seed_entry(VIN1, data).await;
    harness
        .entries
        .set_options(
            &entry.entry_id,
            OptionsOverlay {
                update_interval: Some(30),
                ..OptionsOverlay::default()
            },
        )
        .await
        .unwrap();
    let flow = options_flow(&harness, entry.entry_id, FlowDefaults::default());

    let form = flow.configure(None).await.unwrap();

    assert!(matches!(
        form,
        FlowResult::ShowForm {
            step_id: StepId::User,
            ..
        }
    ));
    assert_eq!(default_of(&form, FieldKey::UpdateInterval), FieldValue::Int(30));
    assert_eq!(
        default_of(&form, FieldKey::Convert),
        FieldValue::Choice("imperial_units".into())
    );
    assert_eq!(default_of(&form, FieldKey::Mutable), FieldValue::Bool(true));
    assert_eq!(default_of(&form, FieldKey::Debug), FieldValue::Bool(false));
    assert_eq!(
        default_of(&form, FieldKey::Spin),
        FieldValue::Secret(SecretString::from(""))
    );
}

#[tokio::test]
async fn update_interval_falls_back_to_flow_default_of_five() {
    let harness = Harness::new([]);
    let entry = harness.seed_entry(VIN1, bare_data()).await;
    let flow = options_flow(&harness, entry.entry_id, FlowDefaults::default());

    let form = flow.configure(None).await.unwrap();

    assert_eq!(default_of(&form, FieldKey::UpdateInterval), FieldValue::Int(5));
}

#[tokio::test]
async fn legacy_scandinavian_miles_flag_selects_matching_conversion() {
    let harness = Harness::new([]);
    let data = EntryData {
        scandinavian_miles: Some(true),
        ..bare_data()
    };
    let entry = harness.seed_entry(VIN1, data).await;
    let flow = options_flow(&harness, entry.entry_id, FlowDefaults::default());

    let form = flow.configure(None).await.unwrap();

    assert_eq!(
        default_of(&form, FieldKey::Convert),
        FieldValue::Choice("scandinavian_miles".into())
    );
}

#[tokio::test]
async fn submission_replaces_overlay_and_leaves_data_alone() {
    let harness = Harness::new([]);
    let entry = harness.seed_entry(VIN1, stored_data(VIN1)).await;
    let flow = options_flow(&harness, entry.entry_id.clone(), FlowDefaults::default());

    let input = FormInput::new()
        .with(FieldKey::UpdateInterval, "15")
        .with(FieldKey::Debug, "on")
        .with(FieldKey::Convert, "scandinavian_miles")
        .with(FieldKey::Spin, "9876");
    let result = flow.configure(Some(input)).await.unwrap();

    let expected = OptionsOverlay {
        update_interval: Some(15),
        spin: Some("9876".into()),
        debug: Some(true),
        mutable: Some(true),
        convert: Some(ConvertUnit::ScandinavianMiles),
        scandinavian_miles: None,
    };
    assert_eq!(
        result,
        FlowResult::OptionsSaved {
            entry_id: entry.entry_id.clone(),
            options: expected.clone(),
        }
    );
    let stored = harness.entries.get_entry(&entry.entry_id).await.unwrap().unwrap();
    assert_eq!(stored.options, expected);
    assert_eq!(stored.data, entry.data);
    assert!(matches!(
        flow.configure(None).await,
        Err(FlowError::Finished)
    ));
}

#[tokio::test]
async fn zero_interval_is_accepted_and_negative_is_rejected() {
    let harness = Harness::new([]);
    let entry = harness.seed_entry(VIN1, stored_data(VIN1)).await;
    let flow = options_flow(&harness, entry.entry_id.clone(), FlowDefaults::default());

    let rejected = flow
        .configure(Some(FormInput::new().with(FieldKey::UpdateInterval, -5)))
        .await
        .unwrap();
    let FlowResult::ShowForm { errors, .. } = rejected else {
        panic!("expected the options form again");
    };
    assert_eq!(errors.get("update_interval"), Some("not_positive"));

    let saved = flow
        .configure(Some(FormInput::new().with(FieldKey::UpdateInterval, 0)))
        .await
        .unwrap();
    let FlowResult::OptionsSaved { options, .. } = saved else {
        panic!("expected the options to be saved");
    };
    assert_eq!(options.update_interval, Some(0));
}

#[tokio::test]
async fn unknown_conversion_is_rejected() {
    let harness = Harness::new([]);
    let entry = harness.seed_entry(VIN1, stored_data(VIN1)).await;
    let flow = options_flow(&harness, entry.entry_id, FlowDefaults::default());

    let result = flow
        .configure(Some(FormInput::new().with(FieldKey::Convert, "furlongs")))
        .await
        .unwrap();

    let FlowResult::ShowForm { errors, .. } = result else {
        panic!("expected the options form again");
    };
    assert_eq!(errors.get("convert"), Some("invalid_choice"));
}

#[tokio::test]
async fn manager_removes_options_flow_once_saved() {
    let harness = Harness::new([]);
    let entry = harness.seed_entry(VIN1, stored_data(VIN1)).await;
    let manager = harness.manager(FlowDefaults::default());

    let (flow_id, _form) = manager.start_options(entry.entry_id).await.unwrap();
    assert!(manager.is_active(&flow_id).await);

    let result = manager
        .configure(&flow_id, Some(FormInput::new()))
        .await
        .unwrap();

    assert!(matches!(result, FlowResult::OptionsSaved { .. }));
    assert!(!manager.is_active(&flow_id).await);
    assert!(matches!(
        manager.configure(&flow_id, None).await,
        Err(FlowError::UnknownFlow(_))
    ));
}
