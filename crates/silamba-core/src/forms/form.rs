use serde_json::Value;
use thiserror::Error;

use crate::models::{
    new_record_id, Advertisement, Banner, Category, Collection, Occasion, Offer, Resource,
    SubCategory,
};
use crate::utils::capitalize;

use super::editable::Editable;
use super::field::{flag_text, FieldKind, FieldSpec, FieldValues};

/// Required fields were left blank.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Required: {}", .missing.join(", "))]
pub struct ValidationError {
    pub missing: Vec<&'static str>,
}

#[derive(Error, Debug)]
pub enum FormError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Failed to encode record: {0}")]
    Encode(#[from] serde_json::Error),
}

/// A validated record ready to send.
#[derive(Debug, Clone, PartialEq)]
pub enum Submission<T> {
    Create(T),
    Update(T),
}

impl<T> Submission<T> {
    pub fn record(&self) -> &T {
        match self {
            Submission::Create(r) | Submission::Update(r) => r,
        }
    }

    pub fn into_record(self) -> T {
        match self {
            Submission::Create(r) | Submission::Update(r) => r,
        }
    }

    pub fn is_create(&self) -> bool {
        matches!(self, Submission::Create(_))
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Submission<U> {
        match self {
            Submission::Create(r) => Submission::Create(f(r)),
            Submission::Update(r) => Submission::Update(f(r)),
        }
    }

    /// Toast text once the submission was stored.
    pub fn success_message(&self, collection: impl Into<Collection>) -> String {
        let verb = if self.is_create() { "added" } else { "updated" };
        format!("{} {} successfully", capitalize(collection.into().singular()), verb)
    }

    pub fn failure_message(&self, collection: impl Into<Collection>) -> String {
        let verb = if self.is_create() { "add" } else { "update" };
        format!("Failed to {} {}", verb, collection.into().singular())
    }
}

/// Add/edit form for one record type.
#[derive(Debug, Clone)]
pub struct RecordForm<T: Editable> {
    base: Option<T>,
    values: FieldValues,
    focus: usize,
}

impl<T: Editable> Default for RecordForm<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Editable> RecordForm<T> {
    /// Blank form for a new record.
    pub fn new() -> Self {
        Self {
            base: None,
            values: FieldValues::blank(T::FIELDS),
            focus: 0,
        }
    }

    /// Form pre-filled from an existing record.
    pub fn edit(record: T) -> Self {
        let mut values = FieldValues::blank(T::FIELDS);
        for spec in T::FIELDS {
            values.set(spec.key, record.field_value(spec.key));
        }
        Self {
            base: Some(record),
            values,
            focus: 0,
        }
    }

    pub fn is_edit(&self) -> bool {
        self.base.is_some()
    }

    pub fn values(&self) -> &FieldValues {
        &self.values
    }

    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        self.values.set(key, value);
    }

    pub fn focused_spec(&self) -> Option<&'static FieldSpec> {
        T::FIELDS.get(self.focus)
    }

    fn focused_value(&mut self) -> Option<&mut String> {
        self.values.get_at_mut(self.focus)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        let missing = self.values.missing_required();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(ValidationError { missing })
        }
    }

    /// Validate and build the record to send. New records get a fresh id.
    pub fn submit(&self) -> Result<Submission<T>, ValidationError> {
        self.validate()?;
        match &self.base {
            Some(base) => {
                let mut record = base.clone();
                record.apply_fields(&self.values);
                Ok(Submission::Update(record))
            }
            None => {
                let mut record = T::default();
                record.apply_fields(&self.values);
                record.set_id(new_record_id());
                Ok(Submission::Create(record))
            }
        }
    }
}

/// Object-safe view of a `RecordForm`, so the admin screen can hold a form
/// for whichever collection is selected.
pub trait FormEditor: Send {
    fn collection(&self) -> Collection;

    fn title(&self) -> String;

    fn fields(&self) -> &'static [FieldSpec];

    fn value_at(&self, index: usize) -> &str;

    fn focus(&self) -> usize;

    fn focus_next(&mut self);

    fn focus_prev(&mut self);

    /// Type into a text field; a space flips a toggle or advances a choice.
    fn input_char(&mut self, c: char);

    fn backspace(&mut self);

    fn toggle(&mut self);

    /// Step a focused choice field through its options.
    fn cycle_choice(&mut self, forward: bool);

    fn set_value(&mut self, key: &str, value: String);

    /// Id of the record being edited, `None` for a new one.
    fn editing_id(&self) -> Option<&str>;

    fn submit_value(&self) -> Result<Submission<Value>, FormError>;
}

impl<T: Editable> FormEditor for RecordForm<T> {
    fn collection(&self) -> Collection {
        T::COLLECTION
    }

    fn title(&self) -> String {
        let action = if self.is_edit() { "Edit" } else { "Add" };
        format!("{} {}", action, capitalize(T::COLLECTION.singular()))
    }

    fn fields(&self) -> &'static [FieldSpec] {
        T::FIELDS
    }

    fn value_at(&self, index: usize) -> &str {
        self.values.get_at(index)
    }

    fn focus(&self) -> usize {
        self.focus
    }

    fn focus_next(&mut self) {
        if !T::FIELDS.is_empty() {
            self.focus = (self.focus + 1) % T::FIELDS.len();
        }
    }

    fn focus_prev(&mut self) {
        if !T::FIELDS.is_empty() {
            self.focus = (self.focus + T::FIELDS.len() - 1) % T::FIELDS.len();
        }
    }

    fn input_char(&mut self, c: char) {
        match self.focused_spec().map(|s| s.kind) {
            Some(FieldKind::Text) => {
                if let Some(value) = self.focused_value() {
                    value.push(c);
                }
            }
            Some(FieldKind::Toggle) if c == ' ' => self.toggle(),
            Some(FieldKind::Choice(_)) if c == ' ' => self.cycle_choice(true),
            _ => {}
        }
    }

    fn backspace(&mut self) {
        if self.focused_spec().map(|s| s.kind) == Some(FieldKind::Text) {
            if let Some(value) = self.focused_value() {
                value.pop();
            }
        }
    }

    fn toggle(&mut self) {
        if self.focused_spec().map(|s| s.kind) == Some(FieldKind::Toggle) {
            if let Some(value) = self.focused_value() {
                let flipped = flag_text(value != "true");
                *value = flipped;
            }
        }
    }

    fn cycle_choice(&mut self, forward: bool) {
        let Some(FieldKind::Choice(options)) = self.focused_spec().map(|s| s.kind) else {
            return;
        };
        if options.is_empty() {
            return;
        }
        if let Some(value) = self.focused_value() {
            let next = match options.iter().position(|o| *o == value.as_str()) {
                Some(i) if forward => (i + 1) % options.len(),
                Some(i) => (i + options.len() - 1) % options.len(),
                None => 0,
            };
            *value = options[next].to_string();
        }
    }

    fn set_value(&mut self, key: &str, value: String) {
        self.values.set(key, value);
    }

    fn editing_id(&self) -> Option<&str> {
        self.base.as_ref().map(|r| r.id())
    }

    fn submit_value(&self) -> Result<Submission<Value>, FormError> {
        let submission = self.submit()?;
        let value = serde_json::to_value(submission.record())?;
        Ok(submission.map(|_| value))
    }
}

/// Blank form for `collection`.
pub fn blank_form(collection: Collection) -> Box<dyn FormEditor> {
    match collection {
        Collection::Remote(Resource::Banners) => Box::new(RecordForm::<Banner>::new()),
        Collection::Remote(Resource::Categories) => Box::new(RecordForm::<Category>::new()),
        Collection::Remote(Resource::SubCategories) => Box::new(RecordForm::<SubCategory>::new()),
        Collection::Remote(Resource::Occasions) => Box::new(RecordForm::<Occasion>::new()),
        Collection::Remote(Resource::Offers) => Box::new(RecordForm::<Offer>::new()),
        Collection::Advertisements => Box::new(RecordForm::<Advertisement>::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn type_text(form: &mut dyn FormEditor, text: &str) {
        for c in text.chars() {
            form.input_char(c);
        }
    }

    #[test]
    fn test_offer_without_title_is_rejected() {
        let mut form = RecordForm::<Offer>::new();
        form.set("image", "https://x/sale.jpg");
        let err = form.submit().unwrap_err();
        assert_eq!(err.missing, vec!["Title"]);
        assert_eq!(err.to_string(), "Required: Title");
    }

    #[test]
    fn test_offer_without_code_has_no_code() {
        let mut form = RecordForm::<Offer>::new();
        form.set("title", "Summer Sale");
        form.set("image", "https://x/sale.jpg");

        let submission = form.submit().unwrap();
        assert!(submission.is_create());
        let offer = submission.into_record();
        assert_eq!(offer.title, "Summer Sale");
        assert_eq!(offer.code, None);
        assert!(offer.is_active);
        assert!(!offer.id.is_empty());
    }

    #[test]
    fn test_edit_submits_update_with_same_id() {
        let offer = Offer {
            id: "o1".to_string(),
            title: "Old".to_string(),
            image: "i.jpg".to_string(),
            code: Some("SAVE20".to_string()),
            ..Default::default()
        };
        let mut form = RecordForm::edit(offer);
        assert_eq!(form.values().get("code"), "SAVE20");
        form.set("title", "New");
        form.set("code", "");

        match form.submit().unwrap() {
            Submission::Update(updated) => {
                assert_eq!(updated.id, "o1");
                assert_eq!(updated.title, "New");
                assert_eq!(updated.code, None);
            }
            other => panic!("expected update, got {:?}", other),
        }
    }

    #[test]
    fn test_editor_typing_and_toggles() {
        let mut form: Box<dyn FormEditor> = blank_form(Resource::Banners.into());
        assert_eq!(form.title(), "Add Banner");
        type_text(form.as_mut(), "Festive");
        form.backspace();
        assert_eq!(form.value_at(0), "Festiv");

        // Walk back from the first field to the last one, the active toggle.
        form.focus_prev();
        assert_eq!(form.fields()[form.focus()].key, "isActive");
        assert_eq!(form.value_at(form.focus()), "true");
        form.input_char(' ');
        assert_eq!(form.value_at(form.focus()), "false");
        form.input_char('x');
        assert_eq!(form.value_at(form.focus()), "false");
    }

    #[test]
    fn test_submit_value_carries_wire_names() {
        let mut form = blank_form(Resource::SubCategories.into());
        form.set_value("categoryId", "1".to_string());
        form.set_value("name", "Wooden Frames".to_string());
        form.set_value("externalUrl", "https://shop.example/frames".to_string());
        form.set_value("image", "f.jpg".to_string());

        let submission = form.submit_value().unwrap();
        let value = submission.record();
        assert_eq!(value["categoryId"], "1");
        assert_eq!(value["externalUrl"], "https://shop.example/frames");
        assert!(form.editing_id().is_none());
    }

    #[test]
    fn test_subcategory_missing_link_lists_all_blanks() {
        let mut form = blank_form(Resource::SubCategories.into());
        form.set_value("name", "Frames".to_string());
        match form.submit_value() {
            Err(FormError::Validation(err)) => assert_eq!(
                err.missing,
                vec!["Parent Category", "External Redirect URL", "Image URL"]
            ),
            other => panic!("expected validation error, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_success_messages() {
        let created = Submission::Create(());
        let updated = Submission::Update(());
        assert_eq!(
            created.success_message(Resource::Categories),
            "Category added successfully"
        );
        assert_eq!(
            updated.failure_message(Resource::SubCategories),
            "Failed to update sub-category"
        );
    }

    #[test]
    fn test_advertisement_position_cycles_through_slots() {
        let mut form = blank_form(Collection::Advertisements);
        assert_eq!(form.title(), "Add Advertisement");
        let position = form
            .fields()
            .iter()
            .position(|f| f.key == "position")
            .expect("position field");
        while form.focus() != position {
            form.focus_next();
        }
        assert_eq!(form.value_at(position), "home-middle");
        form.cycle_choice(true);
        assert_eq!(form.value_at(position), "home-bottom");
        form.cycle_choice(false);
        form.cycle_choice(false);
        assert_eq!(form.value_at(position), "home-top");
        form.cycle_choice(false);
        assert_eq!(form.value_at(position), "floating");
        form.input_char(' ');
        assert_eq!(form.value_at(position), "home-top");

        form.set_value("title", "Wedding Packages".to_string());
        let submission = form.submit_value().unwrap();
        assert!(submission.is_create());
        assert_eq!(submission.record()["position"], "home-top");
        assert_eq!(
            submission.success_message(form.collection()),
            "Advertisement added successfully"
        );
    }
}
