// Declared schema: tables, columns, keys, defaults and indexes
use std::fmt;

/// Action taken on child rows when the referenced parent row is deleted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OnDelete {
    NoAction,
    Cascade,
}

/// Column default
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnDefault {
    /// Literal written into the DDL (`DEFAULT 0`)
    Literal(&'static str),
    /// Filled in by the application with the local time at insert
    Now,
}

impl fmt::Display for ColumnDefault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            // Boolean columns store 0/1, show them the way they are declared
            ColumnDefault::Literal("0") => write!(f, "False"),
            ColumnDefault::Literal("1") => write!(f, "True"),
            ColumnDefault::Literal(value) => write!(f, "{}", value),
            ColumnDefault::Now => write!(f, "now()"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ForeignKeyDef {
    pub table: &'static str,
    pub column: &'static str,
    pub on_delete: OnDelete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnDef {
    pub name: &'static str,
    pub sql_type: &'static str,
    pub primary_key: bool,
    pub nullable: bool,
    pub foreign_key: Option<ForeignKeyDef>,
    pub default: Option<ColumnDefault>,
}

impl ColumnDef {
    const fn new(name: &'static str, sql_type: &'static str) -> Self {
        Self {
            name,
            sql_type,
            primary_key: false,
            nullable: true,
            foreign_key: None,
            default: None,
        }
    }

    const fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self.nullable = false;
        self
    }

    const fn not_null(mut self) -> Self {
        self.nullable = false;
        self
    }

    const fn references(
        mut self,
        table: &'static str,
        column: &'static str,
        on_delete: OnDelete,
    ) -> Self {
        self.foreign_key = Some(ForeignKeyDef { table, column, on_delete });
        self
    }

    const fn default(mut self, default: ColumnDefault) -> Self {
        self.default = Some(default);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableDef {
    pub name: &'static str,
    pub columns: &'static [ColumnDef],
    /// Indexed columns, one single-column index each
    pub indexes: &'static [&'static str],
}

pub const EXPERIMENTS: &str = "experiments";
pub const DATA_POINTS: &str = "data_points";
pub const SUBJECTS: &str = "subjects";
pub const SUBJECT_EXPERIMENT: &str = "subject_experiment";

/// Every table of the schema, parents before children
pub const TABLES: &[TableDef] = &[
    TableDef {
        name: EXPERIMENTS,
        columns: &[
            ColumnDef::new("id", "INTEGER").primary_key(),
            ColumnDef::new("title", "VARCHAR"),
            ColumnDef::new("created_at", "DATETIME").default(ColumnDefault::Now),
            ColumnDef::new("type", "INTEGER"),
            ColumnDef::new("finished", "BOOLEAN").default(ColumnDefault::Literal("0")),
        ],
        indexes: &["id"],
    },
    TableDef {
        name: DATA_POINTS,
        columns: &[
            ColumnDef::new("id", "INTEGER").primary_key(),
            ColumnDef::new("real_value", "FLOAT"),
            ColumnDef::new("target_value", "FLOAT"),
            ColumnDef::new("experiment_id", "INTEGER")
                .not_null()
                .references(EXPERIMENTS, "id", OnDelete::Cascade),
        ],
        indexes: &["id"],
    },
    TableDef {
        name: SUBJECTS,
        columns: &[
            ColumnDef::new("id", "INTEGER").primary_key(),
            ColumnDef::new("gdpr_accepted", "BOOLEAN").default(ColumnDefault::Literal("0")),
        ],
        indexes: &["id"],
    },
    TableDef {
        name: SUBJECT_EXPERIMENT,
        columns: &[
            ColumnDef::new("subject_id", "INTEGER")
                .primary_key()
                .references(SUBJECTS, "id", OnDelete::Cascade),
            ColumnDef::new("experiment_id", "INTEGER")
                .primary_key()
                .references(EXPERIMENTS, "id", OnDelete::Cascade),
        ],
        indexes: &[],
    },
];

/// Look up a declared table by name
pub fn table(name: &str) -> Option<&'static TableDef> {
    TABLES.iter().find(|t| t.name == name)
}

impl TableDef {
    pub fn primary_key_columns(&self) -> Vec<&'static str> {
        self.columns
            .iter()
            .filter(|c| c.primary_key)
            .map(|c| c.name)
            .collect()
    }

    /// Render the idempotent `CREATE TABLE` statement
    pub fn create_sql(&self) -> String {
        let mut lines: Vec<String> = self
            .columns
            .iter()
            .map(|column| {
                let mut line = format!("{} {}", column.name, column.sql_type);
                if !column.nullable {
                    line.push_str(" NOT NULL");
                }
                if let Some(ColumnDefault::Literal(value)) = column.default {
                    line.push_str(&format!(" DEFAULT {}", value));
                }
                line
            })
            .collect();

        lines.push(format!("PRIMARY KEY ({})", self.primary_key_columns().join(", ")));

        for column in self.columns {
            if let Some(fk) = column.foreign_key {
                let mut line = format!(
                    "FOREIGN KEY ({}) REFERENCES {}({})",
                    column.name, fk.table, fk.column
                );
                if fk.on_delete == OnDelete::Cascade {
                    line.push_str(" ON DELETE CASCADE");
                }
                lines.push(line);
            }
        }

        format!(
            "CREATE TABLE IF NOT EXISTS {} (\n    {}\n)",
            self.name,
            lines.join(",\n    ")
        )
    }

    /// Render one `CREATE INDEX` statement per indexed column
    pub fn index_sql(&self) -> Vec<String> {
        self.indexes
            .iter()
            .map(|column| {
                format!(
                    "CREATE INDEX IF NOT EXISTS ix_{table}_{column} ON {table} ({column})",
                    table = self.name,
                    column = column
                )
            })
            .collect()
    }
}
