use crate::models::Collection;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteTarget {
    pub collection: Collection,
    pub id: String,
    pub label: String,
}

/// Two-step delete: `request` arms the prompt, `confirm` hands back the
/// target. Nothing is deleted unless both steps happen.
#[derive(Debug, Clone, Default)]
pub struct ConfirmDelete {
    pending: Option<DeleteTarget>,
}

impl ConfirmDelete {
    pub fn request(
        &mut self,
        collection: impl Into<Collection>,
        id: impl Into<String>,
        label: impl Into<String>,
    ) {
        self.pending = Some(DeleteTarget {
            collection: collection.into(),
            id: id.into(),
            label: label.into(),
        });
    }

    pub fn pending(&self) -> Option<&DeleteTarget> {
        self.pending.as_ref()
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn prompt(&self) -> Option<String> {
        self.pending.as_ref().map(|t| {
            format!(
                "Are you sure you want to delete {} \"{}\"? (y/n)",
                t.collection.singular(),
                t.label
            )
        })
    }

    pub fn confirm(&mut self) -> Option<DeleteTarget> {
        self.pending.take()
    }

    pub fn cancel(&mut self) {
        self.pending = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Resource;

    #[test]
    fn test_confirm_returns_target_once() {
        let mut confirm = ConfirmDelete::default();
        assert!(confirm.confirm().is_none());

        confirm.request(Resource::Offers, "o1", "Summer Sale");
        assert_eq!(
            confirm.prompt().as_deref(),
            Some("Are you sure you want to delete offer \"Summer Sale\"? (y/n)")
        );
        let target = confirm.confirm().unwrap();
        assert_eq!(target.id, "o1");
        assert!(confirm.confirm().is_none());
    }

    #[test]
    fn test_cancel_discards() {
        let mut confirm = ConfirmDelete::default();
        confirm.request(Collection::Advertisements, "ad1", "Wedding Packages");
        assert_eq!(
            confirm.pending().map(|t| t.collection),
            Some(Collection::Advertisements)
        );
        confirm.cancel();
        assert!(!confirm.is_pending());
    }
}
