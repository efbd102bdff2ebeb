//! Database schema definitions.

/// Name of the notes table.
pub const NOTES_TABLE: &str = "notes";

/// SQL to create the notes table.
pub const CREATE_NOTES_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS notes (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    title TEXT NOT NULL,
    content TEXT NOT NULL DEFAULT '',
    pinned INTEGER NOT NULL DEFAULT 0 CHECK (pinned IN (0, 1)),
    created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP,
    updated_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
)
"#;

/// SQL to create the app_info key/value table.
pub const CREATE_APP_INFO_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS app_info (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    key TEXT UNIQUE NOT NULL,
    value TEXT,
    created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
)
"#;

/// SQL to create the users table.
pub const CREATE_USERS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    username TEXT UNIQUE NOT NULL,
    email TEXT UNIQUE NOT NULL,
    created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
)
"#;

/// One column as reported by `PRAGMA table_info`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDef {
    pub name: String,
    pub decl_type: String,
    pub not_null: bool,
    pub default: Option<String>,
    pub primary_key: bool,
}

impl ColumnDef {
    fn expected(
        name: &str,
        decl_type: &str,
        not_null: bool,
        default: Option<&str>,
        primary_key: bool,
    ) -> Self {
        Self {
            name: name.to_string(),
            decl_type: decl_type.to_string(),
            not_null,
            default: default.map(str::to_string),
            primary_key,
        }
    }

    /// Compare against another column, ignoring case and whitespace in
    /// declared types and default expressions.
    pub fn matches(&self, other: &ColumnDef) -> bool {
        self.name.eq_ignore_ascii_case(&other.name)
            && normalize(&self.decl_type) == normalize(&other.decl_type)
            && self.not_null == other.not_null
            && self.primary_key == other.primary_key
            && self.default.as_deref().map(normalize) == other.default.as_deref().map(normalize)
    }
}

fn normalize(s: &str) -> String {
    s.split_whitespace().collect::<String>().to_ascii_uppercase()
}

/// Columns of the notes table in declaration order.
pub fn notes_columns() -> Vec<ColumnDef> {
    vec![
        ColumnDef::expected("id", "INTEGER", false, None, true),
        ColumnDef::expected("title", "TEXT", true, None, false),
        ColumnDef::expected("content", "TEXT", true, Some("''"), false),
        ColumnDef::expected("pinned", "INTEGER", true, Some("0"), false),
        ColumnDef::expected("created_at", "TIMESTAMP", false, Some("CURRENT_TIMESTAMP"), false),
        ColumnDef::expected("updated_at", "TIMESTAMP", false, Some("CURRENT_TIMESTAMP"), false),
    ]
}

/// Describe how `actual` deviates from `expected`, or `None` if compatible.
///
/// Column order is not significant.
pub fn diff_columns(expected: &[ColumnDef], actual: &[ColumnDef]) -> Option<String> {
    for want in expected {
        match actual.iter().find(|c| c.name.eq_ignore_ascii_case(&want.name)) {
            None => return Some(format!("missing column `{}`", want.name)),
            Some(have) if !want.matches(have) => {
                return Some(format!(
                    "column `{}` is declared as {} but expected {}",
                    want.name,
                    describe(have),
                    describe(want)
                ));
            }
            Some(_) => {}
        }
    }

    actual
        .iter()
        .find(|c| !expected.iter().any(|e| e.name.eq_ignore_ascii_case(&c.name)))
        .map(|extra| format!("unexpected column `{}`", extra.name))
}

fn describe(col: &ColumnDef) -> String {
    let mut parts = vec![if col.decl_type.is_empty() {
        "<untyped>".to_string()
    } else {
        col.decl_type.clone()
    }];
    if col.primary_key {
        parts.push("PRIMARY KEY".to_string());
    }
    if col.not_null {
        parts.push("NOT NULL".to_string());
    }
    if let Some(default) = &col.default {
        parts.push(format!("DEFAULT {}", default));
    }
    parts.join(" ")
}

/// Check whether `column` is declared AUTOINCREMENT in a `CREATE TABLE`
/// statement, either on its own definition or in a table-level
/// `PRIMARY KEY (column AUTOINCREMENT)` constraint.
///
/// String literals are skipped, so a CHECK mentioning the word does not count.
pub fn column_is_autoincrement(create_sql: &str, column: &str) -> bool {
    table_body_segments(create_sql).iter().any(|segment| {
        let words: Vec<&str> = segment
            .split(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
            .filter(|w| !w.is_empty())
            .collect();
        let has = |word: &str| words.iter().any(|w| w.eq_ignore_ascii_case(word));

        let own_definition = words
            .first()
            .is_some_and(|first| first.eq_ignore_ascii_case(column));
        let table_constraint =
            !own_definition && is_constraint_start(&words) && has("PRIMARY") && has(column);

        (own_definition || table_constraint) && has("AUTOINCREMENT")
    })
}

fn is_constraint_start(words: &[&str]) -> bool {
    words
        .first()
        .is_some_and(|w| w.eq_ignore_ascii_case("PRIMARY") || w.eq_ignore_ascii_case("CONSTRAINT"))
}

/// Split the parenthesized body of a `CREATE TABLE` into its top-level,
/// comma-separated definitions with string literal contents removed.
fn table_body_segments(create_sql: &str) -> Vec<String> {
    let Some(start) = create_sql.find('(') else {
        return Vec::new();
    };

    let mut segments = Vec::new();
    let mut current = String::new();
    let mut depth = 0usize;
    let mut in_literal = false;

    for c in create_sql[start + 1..].chars() {
        if in_literal {
            // '' inside a literal reads as close-then-reopen, which is harmless here.
            if c == '\'' {
                in_literal = false;
            }
            continue;
        }
        match c {
            '\'' => in_literal = true,
            '(' => {
                depth += 1;
                current.push(c);
            }
            ')' if depth == 0 => break,
            ')' => {
                depth -= 1;
                current.push(c);
            }
            ',' if depth == 0 => segments.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }
    segments.push(current);
    segments
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expected_columns_match_themselves() {
        let cols = notes_columns();
        assert_eq!(cols.len(), 6);
        assert_eq!(diff_columns(&cols, &cols), None);
    }

    #[test]
    fn test_order_and_case_are_ignored() {
        let expected = notes_columns();
        let mut actual: Vec<ColumnDef> = expected
            .iter()
            .rev()
            .map(|c| ColumnDef {
                decl_type: c.decl_type.to_lowercase(),
                default: c.default.as_ref().map(|d| d.to_lowercase()),
                ..c.clone()
            })
            .collect();
        actual[0].name = actual[0].name.to_uppercase();
        assert_eq!(diff_columns(&expected, &actual), None);
    }

    #[test]
    fn test_reports_missing_column() {
        let expected = notes_columns();
        let actual: Vec<ColumnDef> = expected
            .iter()
            .filter(|c| c.name != "pinned")
            .cloned()
            .collect();
        assert_eq!(
            diff_columns(&expected, &actual).as_deref(),
            Some("missing column `pinned`")
        );
    }

    #[test]
    fn test_reports_extra_column() {
        let expected = notes_columns();
        let mut actual = expected.clone();
        actual.push(ColumnDef::expected("tags", "TEXT", false, None, false));
        assert_eq!(
            diff_columns(&expected, &actual).as_deref(),
            Some("unexpected column `tags`")
        );
    }

    #[test]
    fn test_reports_nullable_title() {
        let expected = notes_columns();
        let mut actual = expected.clone();
        actual[1].not_null = false;
        let reason = diff_columns(&expected, &actual).unwrap();
        assert!(reason.starts_with("column `title`"), "{reason}");
        assert!(reason.ends_with("expected TEXT NOT NULL"), "{reason}");
    }

    #[test]
    fn test_autoincrement_on_notes_table() {
        assert!(column_is_autoincrement(CREATE_NOTES_TABLE, "id"));
        assert!(!column_is_autoincrement(CREATE_NOTES_TABLE, "title"));
    }

    #[test]
    fn test_autoincrement_ignores_literals_and_other_columns() {
        let sql = "CREATE TABLE notes (
            id INTEGER PRIMARY KEY,
            title TEXT NOT NULL CHECK (title != 'id AUTOINCREMENT'),
            note_autoincrement TEXT
        )";
        assert!(!column_is_autoincrement(sql, "id"));
    }

    #[test]
    fn test_autoincrement_quoted_and_table_constraint() {
        assert!(column_is_autoincrement(
            r#"CREATE TABLE notes ("id" integer primary key autoincrement, title TEXT)"#,
            "id"
        ));
        assert!(column_is_autoincrement(
            "CREATE TABLE notes (id INTEGER, title TEXT, PRIMARY KEY (id AUTOINCREMENT))",
            "id"
        ));
        assert!(!column_is_autoincrement(
            "CREATE TABLE notes (id INTEGER, title TEXT, PRIMARY KEY (id))",
            "id"
        ));
    }
}
