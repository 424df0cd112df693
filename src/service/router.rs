use crate::model::RoutingContext;

/// Resolves the folder where the note for a term defined in the active document must be written.
///
/// The first mapping whose source is a prefix of the document path wins. The default folder is used when there's no
/// active document or no mapping matches.
pub fn resolve_folder<'a>(ctx: &RoutingContext<'a>) -> &'a str {
    let Some(document_path) = ctx.active_document_path else {
        return ctx.default_folder;
    };
    ctx.mappings
        .iter()
        .find(|m| document_path.starts_with(&m.source_path))
        .map(|m| m.target_path.as_str())
        .unwrap_or(ctx.default_folder)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::model::FolderMapping;

    fn ctx<'a>(path: Option<&'a str>, mappings: &'a [FolderMapping]) -> RoutingContext<'a> {
        RoutingContext {
            active_document_path: path,
            mappings,
            default_folder: "Glossary",
        }
    }

    #[test]
    fn test_resolve_folder() {
        let mappings = [FolderMapping::new("Projects", "Projects/Glossary")];
        assert_eq!(resolve_folder(&ctx(Some("Projects/Notes/a.md"), &mappings)), "Projects/Glossary");
        assert_eq!(resolve_folder(&ctx(Some("Other/b.md"), &mappings)), "Glossary");
        assert_eq!(resolve_folder(&ctx(None, &mappings)), "Glossary");
    }

    #[test]
    fn test_first_match_wins() {
        let mappings = [
            FolderMapping::new("Projects", "Projects/Glossary"),
            FolderMapping::new("Projects/Work", "Work/Glossary"),
        ];
        assert_eq!(resolve_folder(&ctx(Some("Projects/Work/a.md"), &mappings)), "Projects/Glossary");
    }

    #[test]
    fn test_plain_prefix_match() {
        // Not segment-aware: "Projects" is a prefix of "ProjectsArchive"
        let mappings = [FolderMapping::new("Projects", "Projects/Glossary")];
        assert_eq!(resolve_folder(&ctx(Some("ProjectsArchive/a.md"), &mappings)), "Projects/Glossary");
        assert_eq!(resolve_folder(&ctx(Some("projects/a.md"), &mappings)), "Glossary");
        assert_eq!(resolve_folder(&ctx(Some("Projects/a.md"), &[])), "Glossary");
    }
}
