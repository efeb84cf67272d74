pub use z80lint_rule_tables::{
    Category, LegendEntry, RuleTables, TableError, UndeclaredPlaceholder,
};
