//! Access resolution: which documents may this caller read.
//!
//! Admins read the whole corpus. Everyone else reads the documents linked
//! to their categories. The resolved id set is the access-control
//! boundary; no later stage re-checks visibility.

use kennisbank_core::Result;
use kennisbank_store::{SqliteStore, UserRole};

/// Result of access resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessScope {
    /// Non-admin caller with no category assignments at all.
    NoCategories,
    /// The document ids the caller may read. May be empty.
    Documents(Vec<String>),
}

/// Resolve the caller's readable document set.
///
/// `category_filters` optionally narrows a non-admin caller's categories
/// to `filters ∩ assigned`. When that intersection is empty the filter is
/// ignored and the full assigned set is used. Admins ignore the filter.
pub fn resolve_scope(
    store: &SqliteStore,
    user_id: &str,
    role: UserRole,
    category_filters: Option<&[String]>,
) -> Result<AccessScope> {
    if role.is_admin() {
        return Ok(AccessScope::Documents(store.all_document_ids()?));
    }

    let assigned = store.user_category_ids(user_id)?;
    if assigned.is_empty() {
        return Ok(AccessScope::NoCategories);
    }

    let selected = match category_filters.filter(|f| !f.is_empty()) {
        Some(filters) => {
            let narrowed: Vec<String> = assigned
                .iter()
                .filter(|c| filters.contains(c))
                .cloned()
                .collect();
            if narrowed.is_empty() {
                assigned
            } else {
                narrowed
            }
        }
        None => assigned,
    };

    Ok(AccessScope::Documents(
        store.document_ids_for_categories(&selected)?,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use kennisbank_store::NewDocument;
    use tempfile::TempDir;

    fn seed_doc(store: &SqliteStore, title: &str) -> String {
        store
            .add_document(&NewDocument {
                title: title.into(),
                file_type: "pdf".into(),
                content_text: "tekst".into(),
                file_url: format!("https://files.example/{}", title),
                ..Default::default()
            })
            .unwrap()
    }

    fn test_store() -> (SqliteStore, TempDir) {
        let dir = TempDir::new().unwrap();
        let store = SqliteStore::open(dir.path()).unwrap();
        (store, dir)
    }

    #[test]
    fn test_admin_sees_full_corpus() {
        let (store, _dir) = test_store();
        let d1 = seed_doc(&store, "a");
        let d2 = seed_doc(&store, "b");

        let scope = resolve_scope(&store, "admin-1", UserRole::Admin, None).unwrap();
        let AccessScope::Documents(mut docs) = scope else {
            panic!("admin should always get a document set");
        };
        docs.sort();
        let mut expected = vec![d1, d2];
        expected.sort();
        assert_eq!(docs, expected);
    }

    #[test]
    fn test_no_assignments_is_not_an_error() {
        let (store, _dir) = test_store();
        seed_doc(&store, "a");

        let scope = resolve_scope(&store, "user-1", UserRole::Medewerker, None).unwrap();
        assert_eq!(scope, AccessScope::NoCategories);
    }

    #[test]
    fn test_member_scope_is_category_linked_documents() {
        let (store, _dir) = test_store();
        let hr = store.add_category("HR").unwrap();
        let it = store.add_category("IT").unwrap();
        let d1 = seed_doc(&store, "handboek");
        let d2 = seed_doc(&store, "netwerk");
        store.link_document_category(&d1, &hr).unwrap();
        store.link_document_category(&d2, &it).unwrap();
        store.assign_user_category("user-1", &hr).unwrap();

        let scope = resolve_scope(&store, "user-1", UserRole::Medewerker, None).unwrap();
        assert_eq!(scope, AccessScope::Documents(vec![d1.clone()]));

        // Adding a category assignment never shrinks the scope.
        store.assign_user_category("user-1", &it).unwrap();
        let scope = resolve_scope(&store, "user-1", UserRole::Medewerker, None).unwrap();
        let AccessScope::Documents(docs) = scope else {
            panic!("expected a document set");
        };
        assert!(docs.contains(&d1));
        assert!(docs.contains(&d2));
    }

    #[test]
    fn test_category_filter_narrows() {
        let (store, _dir) = test_store();
        let hr = store.add_category("HR").unwrap();
        let it = store.add_category("IT").unwrap();
        let d1 = seed_doc(&store, "handboek");
        let d2 = seed_doc(&store, "netwerk");
        store.link_document_category(&d1, &hr).unwrap();
        store.link_document_category(&d2, &it).unwrap();
        store.assign_user_category("user-1", &hr).unwrap();
        store.assign_user_category("user-1", &it).unwrap();

        let scope = resolve_scope(
            &store,
            "user-1",
            UserRole::Medewerker,
            Some(&[it.clone()]),
        )
        .unwrap();
        assert_eq!(scope, AccessScope::Documents(vec![d2]));
    }

    #[test]
    fn test_disjoint_filter_falls_back_to_full_scope() {
        let (store, _dir) = test_store();
        let hr = store.add_category("HR").unwrap();
        let d1 = seed_doc(&store, "handboek");
        store.link_document_category(&d1, &hr).unwrap();
        store.assign_user_category("user-1", &hr).unwrap();

        // Filtering on a category the user is not linked to must not widen
        // or empty the scope; the filter is dropped.
        let scope = resolve_scope(
            &store,
            "user-1",
            UserRole::Medewerker,
            Some(&["other-category".to_string()]),
        )
        .unwrap();
        assert_eq!(scope, AccessScope::Documents(vec![d1]));
    }

    #[test]
    fn test_categories_without_documents() {
        let (store, _dir) = test_store();
        let hr = store.add_category("HR").unwrap();
        store.assign_user_category("user-1", &hr).unwrap();

        let scope = resolve_scope(&store, "user-1", UserRole::Medewerker, None).unwrap();
        assert_eq!(scope, AccessScope::Documents(Vec::new()));
    }
}
