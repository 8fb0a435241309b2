//! Fixed files written into a new catalog repository
//!
//! The catalog content itself is produced by other toolkit commands; these
//! templates only document the expected layout and keep secrets out of git.

use chrono::{DateTime, TimeZone};

/// Name of the remote every catalog repository syncs with.
pub const REMOTE_NAME: &str = "origin";

/// Primary branch names, tried in order.
pub const PRIMARY_BRANCHES: [&str; 2] = ["main", "master"];

pub const README_FILE: &str = "README.md";
pub const GITIGNORE_FILE: &str = ".gitignore";

pub const INITIAL_COMMIT_MESSAGE: &str = "Initialize data catalog";

/// Files the catalog tools write, reported by name in `status`.
pub const WELL_KNOWN_FILES: [&str; 6] = [
    "metadata.parquet",
    "last_scan.json",
    "ontology.jsonld",
    "ONTOLOGY_SUMMARY.md",
    "procedure_analysis.jsonld",
    "ontology_config.toml",
];

pub const README_TEMPLATE: &str = r#"# Data Catalog

Shared database metadata catalog, kept in sync with the team remote by
`catalog-sync`.

## Layout

| File | Contents |
|------|----------|
| `metadata.parquet` | Column-level metadata for every scanned target |
| `last_scan.json` | Timestamp and row count of the most recent scan per target |
| `ontology.jsonld` | JSON-LD knowledge graph built from the metadata |
| `ONTOLOGY_SUMMARY.md` | Human-readable summary of the ontology |
| `procedure_analysis.jsonld` | Stored procedure analysis |
| `ontology_config.toml` | Ontology builder configuration |
| `reviews/` | Review workbooks and applied feedback |

## Syncing

```
catalog-sync            # show status
catalog-sync --pull     # fetch teammates' changes
catalog-sync --push     # commit and publish local changes
catalog-sync --full     # pull, then push
```

Connection settings (`targets.toml`, `.env`) never belong in this repository.
"#;

pub const GITIGNORE_TEMPLATE: &str = r#"# Credentials
.env
targets.toml

# Temporary files
*.tmp
*.bak

# OS artifacts
.DS_Store
Thumbs.db
"#;

/// Commit message for a push, stamped with the local date and time.
pub fn commit_message<Tz>(now: DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    format!("Update data catalog: {}", now.format("%Y-%m-%d %H:%M:%S"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn given_timestamp_when_building_commit_message_then_contains_date_and_time() {
        let now = Utc.with_ymd_and_hms(2024, 3, 7, 9, 5, 0).unwrap();
        assert_eq!(commit_message(now), "Update data catalog: 2024-03-07 09:05:00");
    }

    #[test]
    fn given_gitignore_template_then_excludes_credentials_and_temp_files() {
        let lines: Vec<&str> = GITIGNORE_TEMPLATE.lines().collect();
        for pattern in [".env", "targets.toml", "*.tmp", "*.bak", ".DS_Store", "Thumbs.db"] {
            assert!(lines.contains(&pattern), "missing {pattern}");
        }
    }

    #[test]
    fn given_readme_template_then_documents_every_well_known_file() {
        for name in WELL_KNOWN_FILES {
            assert!(README_TEMPLATE.contains(name), "README lacks {name}");
        }
    }
}
