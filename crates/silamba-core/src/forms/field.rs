/// How a field is edited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    /// On/off switch stored as "true" / "false".
    Toggle,
    /// Id of a parent category, picked from the loaded categories.
    CategoryRef,
    /// One of a fixed list of values.
    Choice(&'static [&'static str]),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    /// Wire name of the field.
    pub key: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
    pub required: bool,
    /// Initial value on a blank form.
    pub default: &'static str,
}

impl FieldSpec {
    pub const fn text(key: &'static str, label: &'static str) -> Self {
        Self {
            key,
            label,
            kind: FieldKind::Text,
            required: false,
            default: "",
        }
    }

    pub const fn toggle(key: &'static str, label: &'static str, on: bool) -> Self {
        Self {
            key,
            label,
            kind: FieldKind::Toggle,
            required: false,
            default: if on { "true" } else { "false" },
        }
    }

    pub const fn category(key: &'static str, label: &'static str) -> Self {
        Self {
            key,
            label,
            kind: FieldKind::CategoryRef,
            required: true,
            default: "",
        }
    }

    /// Fixed-option field starting at `default`.
    pub const fn choice(
        key: &'static str,
        label: &'static str,
        options: &'static [&'static str],
        default: &'static str,
    ) -> Self {
        Self {
            key,
            label,
            kind: FieldKind::Choice(options),
            required: true,
            default,
        }
    }

    pub const fn required(mut self) -> Self {
        self.required = true;
        self
    }
}

/// Current string value of every field on a form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldValues {
    specs: &'static [FieldSpec],
    values: Vec<String>,
}

impl FieldValues {
    pub fn blank(specs: &'static [FieldSpec]) -> Self {
        Self {
            specs,
            values: specs.iter().map(|s| s.default.to_string()).collect(),
        }
    }

    pub fn specs(&self) -> &'static [FieldSpec] {
        self.specs
    }

    fn position(&self, key: &str) -> Option<usize> {
        self.specs.iter().position(|s| s.key == key)
    }

    /// Raw value, or "" for an undeclared key.
    pub fn get(&self, key: &str) -> &str {
        self.position(key)
            .and_then(|i| self.values.get(i))
            .map_or("", String::as_str)
    }

    pub fn get_at(&self, index: usize) -> &str {
        self.values.get(index).map_or("", String::as_str)
    }

    pub fn get_at_mut(&mut self, index: usize) -> Option<&mut String> {
        self.values.get_mut(index)
    }

    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        if let Some(i) = self.position(key) {
            self.values[i] = value.into();
        }
    }

    /// Trimmed value.
    pub fn text(&self, key: &str) -> String {
        self.get(key).trim().to_string()
    }

    /// Trimmed value, `None` when blank.
    pub fn optional(&self, key: &str) -> Option<String> {
        let value = self.get(key).trim();
        if value.is_empty() {
            None
        } else {
            Some(value.to_string())
        }
    }

    pub fn flag(&self, key: &str) -> bool {
        self.get(key) == "true"
    }

    /// Labels of required fields left blank, in form order.
    pub fn missing_required(&self) -> Vec<&'static str> {
        self.specs
            .iter()
            .zip(&self.values)
            .filter(|(spec, value)| spec.required && value.trim().is_empty())
            .map(|(spec, _)| spec.label)
            .collect()
    }
}

pub(crate) fn flag_text(on: bool) -> String {
    if on { "true" } else { "false" }.to_string()
}
