//! Rendering options.

/// How repeated values of one attribute accumulate.
///
/// With [`ValueOrder::Prepend`] each newly parsed value is placed in front of
/// the values already present, so `{class: [thin]}` expanded with `.thick`
/// serializes as `class="thick thin"`. This matches the historical output of
/// the renderer. [`ValueOrder::Append`] keeps values in source order instead.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum ValueOrder {
    #[default]
    Prepend,
    Append,
}

/// What to do with attribute text that matches no recognized form.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum MalformedPolicy {
    /// Fail the render of the block.
    #[default]
    Fail,
    /// Log a warning, drop the offending word and keep parsing.
    Skip,
}

/// Options shared by the attribute parser and the block renderer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct RenderOptions {
    /// Accumulation order for repeated attribute values.
    pub value_order: ValueOrder,
    /// Handling of malformed attribute annotations.
    pub malformed_attributes: MalformedPolicy,
}

impl RenderOptions {
    /// Set the value accumulation order.
    #[must_use]
    pub fn with_value_order(mut self, order: ValueOrder) -> Self {
        self.value_order = order;
        self
    }

    /// Set the malformed attribute policy.
    #[must_use]
    pub fn with_malformed_policy(mut self, policy: MalformedPolicy) -> Self {
        self.malformed_attributes = policy;
        self
    }
}
