//! Contract template assets.
//!
//! Templates are plain `.txt` files in the configured directory; the file
//! name doubles as the identifier carried through the select menu and the
//! signing modal, so it must stay a bare file name.

use std::fs;
use std::path::Path;

use crate::common::error::StoreResult;

/// A selectable contract template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractTemplate {
    /// Bare file name, e.g. "retainer_agreement.txt".
    pub file_name: String,
    /// Display title derived from the file name.
    pub title: String,
}

/// List the `.txt` templates in `dir`, sorted by file name.
pub fn list_templates(dir: impl AsRef<Path>) -> StoreResult<Vec<ContractTemplate>> {
    let mut templates = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let name = entry.file_name();
        let Some(name) = name.to_str() else { continue };
        if name.ends_with(".txt") {
            templates.push(ContractTemplate {
                file_name: name.to_string(),
                title: title_for(name),
            });
        }
    }
    templates.sort_by(|a, b| a.file_name.cmp(&b.file_name));
    Ok(templates)
}

/// Read a template's text. Rejects anything that is not a bare `.txt`
/// file name, since the name travels through interaction custom ids.
pub fn read_template(dir: impl AsRef<Path>, file_name: &str) -> StoreResult<String> {
    if !is_valid_template_name(file_name) {
        return Err(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            format!("invalid contract template name '{}'", file_name),
        )
        .into());
    }
    Ok(fs::read_to_string(dir.as_ref().join(file_name))?)
}

/// "retainer_agreement.txt" -> "retainer agreement". Select menu labels
/// are capped at 100 characters.
pub fn title_for(file_name: &str) -> String {
    let mut title: String = file_name
        .trim_end_matches(".txt")
        .replace('_', " ");
    title.truncate(100);
    title
}

/// Uppercase heading for embeds and the contract log.
pub fn heading_for(file_name: &str) -> String {
    title_for(file_name).to_uppercase()
}

fn is_valid_template_name(file_name: &str) -> bool {
    !file_name.is_empty()
        && file_name.ends_with(".txt")
        && !file_name.contains('/')
        && !file_name.contains('\\')
        && !file_name.contains("..")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;
    use tempfile::TempDir;

    #[test]
    fn lists_only_txt_files_sorted() {
        let dir = TempDir::new().unwrap();
        for name in ["retainer_agreement.txt", "nda.txt", "logo.png"] {
            File::create(dir.path().join(name)).unwrap();
        }

        let templates = list_templates(dir.path()).unwrap();
        assert_eq!(
            templates.iter().map(|t| t.file_name.as_str()).collect::<Vec<_>>(),
            vec!["nda.txt", "retainer_agreement.txt"]
        );
        assert_eq!(templates[1].title, "retainer agreement");
    }

    #[test]
    fn reads_template_text() {
        let dir = TempDir::new().unwrap();
        let mut f = File::create(dir.path().join("nda.txt")).unwrap();
        write!(f, "The parties agree...").unwrap();

        let text = read_template(dir.path(), "nda.txt").unwrap();
        assert_eq!(text, "The parties agree...");
    }

    #[test]
    fn rejects_path_traversal() {
        let dir = TempDir::new().unwrap();
        assert!(read_template(dir.path(), "../secrets.txt").is_err());
        assert!(read_template(dir.path(), "/etc/passwd.txt").is_err());
        assert!(read_template(dir.path(), "nda.pdf").is_err());
        assert!(read_template(dir.path(), "").is_err());
    }

    #[test]
    fn derives_headings() {
        assert_eq!(heading_for("retainer_agreement.txt"), "RETAINER AGREEMENT");
    }
}
