use sea_orm_migration::prelude::*;

/// How enumerated columns are stored.
///
/// With native enums the column only accepts its declared values (a CHECK
/// constraint over the value set). Without them the column is a plain string,
/// which keeps throwaway SQLite databases free of backend-specific DDL.
/// Entities always bind these columns as strings, so both layouts are
/// read and written the same way.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnumStorage {
    pub native: bool,
}

impl EnumStorage {
    pub fn from_env() -> Self {
        let native = std::env::var("DB_NATIVE_ENUMS")
            .map(|v| !matches!(v.trim().to_ascii_lowercase().as_str(), "false" | "0" | "no"))
            .unwrap_or(true);
        Self { native }
    }

    pub fn column<C>(&self, col: C, values: &[&str], default: &str) -> ColumnDef
    where
        C: IntoIden + Clone + 'static,
    {
        let len = values.iter().map(|v| v.len()).max().unwrap_or(1) as u32;
        let mut def = ColumnDef::new(col.clone());
        def.string_len(len.max(20)).not_null().default(default.to_string());
        if self.native {
            def.check(Expr::col(col).is_in(values.iter().map(|v| ToString::to_string(v))));
        }
        def
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Iden, Clone)]
    enum Probe {
        Table,
        Kind,
    }

    fn render(storage: EnumStorage) -> String {
        Table::create()
            .table(Probe::Table)
            .col(storage.column(Probe::Kind, &["A", "B"], "A"))
            .to_owned()
            .to_string(PostgresQueryBuilder)
    }

    #[test]
    fn native_columns_carry_value_check() {
        let sql = render(EnumStorage { native: true });
        assert!(sql.contains("CHECK"), "{sql}");
        assert!(sql.contains("'B'"), "{sql}");
    }

    #[test]
    fn plain_columns_are_unconstrained_strings() {
        let sql = render(EnumStorage { native: false });
        assert!(!sql.contains("CHECK"), "{sql}");
        assert!(sql.contains("DEFAULT 'A'"), "{sql}");
    }
}
