//! Resource paths derived from the project id.

/// The only database the emulator wiring targets.
pub const DEFAULT_DATABASE: &str = "(default)";

/// `projects/{project_id}/databases/(default)`, sent as the resource prefix header.
pub fn resource_prefix(project_id: &str) -> String {
    format!("projects/{project_id}/databases/{DEFAULT_DATABASE}")
}

/// The parent of every root collection: `{resource_prefix}/documents`.
pub fn documents_path(project_id: &str) -> String {
    let mut path = resource_prefix(project_id);
    path.push_str("/documents");
    path
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resource_prefix() {
        assert_eq!(resource_prefix("proj1"), "projects/proj1/databases/(default)");
        assert_eq!(
            documents_path("proj1"),
            "projects/proj1/databases/(default)/documents"
        );
    }
}
