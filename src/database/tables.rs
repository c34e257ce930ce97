/// Static description of a table the query builder may touch.
///
/// Table and column names are interpolated into SQL text, so they only ever come
/// from these constants. Request input reaches SQL through bound parameters alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableSpec {
    pub name: &'static str,
    pub columns: &'static [&'static str],
}

impl TableSpec {
    pub fn has_column(&self, column: &str) -> bool {
        self.columns.contains(&column)
    }
}

pub const COMPANIES: TableSpec = TableSpec {
    name: "companies",
    columns: &["handle", "name", "employees", "description", "logo_url"],
};

pub const JOBS: TableSpec = TableSpec {
    name: "jobs",
    columns: &["id", "title", "salary", "equity", "company_handle", "date_posted"],
};

pub const USERS: TableSpec = TableSpec {
    name: "users",
    columns: &[
        "username",
        "password",
        "first_name",
        "last_name",
        "email",
        "photo_url",
        "is_admin",
    ],
};

/// Schema applied by `jobly migrate`
pub const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS companies (
    handle TEXT PRIMARY KEY,
    name TEXT NOT NULL UNIQUE,
    employees INTEGER,
    description TEXT,
    logo_url TEXT DEFAULT ''
);

CREATE TABLE IF NOT EXISTS jobs (
    id SERIAL PRIMARY KEY,
    title TEXT NOT NULL,
    salary FLOAT NOT NULL,
    equity FLOAT NOT NULL CHECK (equity <= 1.0),
    company_handle TEXT NOT NULL REFERENCES companies ON DELETE CASCADE,
    date_posted TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW()
);

CREATE TABLE IF NOT EXISTS users (
    username TEXT PRIMARY KEY,
    password TEXT NOT NULL,
    first_name TEXT NOT NULL,
    last_name TEXT NOT NULL,
    email TEXT NOT NULL UNIQUE,
    photo_url TEXT,
    is_admin BOOLEAN NOT NULL DEFAULT FALSE
);
"#;
