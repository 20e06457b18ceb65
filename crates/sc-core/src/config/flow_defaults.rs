use crate::entry::ConvertUnit;

/// Hard defaults used by every flow.
///
/// Built once at startup (optionally overridden from `[defaults]` in the
/// TOML config) and shared read-only by all flows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlowDefaults {
    /// Update interval (minutes) pre-filled in the initial credentials form.
    pub initial_update_interval: u32,
    /// Update interval (minutes) when neither options nor entry data set one.
    pub update_interval: u32,
    pub debug: bool,
    pub mutable: bool,
    pub convert: ConvertUnit,
    pub spin: String,
}

impl Default for FlowDefaults {
    fn default() -> Self {
        Self {
            initial_update_interval: 1,
            update_interval: 5,
            debug: false,
            mutable: true,
            convert: ConvertUnit::NoConversion,
            spin: String::new(),
        }
    }
}
