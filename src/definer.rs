//! Build-time driver that turns SQL statements into generated Rust types.
//!
//! Each `define_*` call runs its statement against a live database inside a
//! transaction that is always rolled back, reads the result metadata, and
//! writes the matching tuple/query/update/value-of files. A failing
//! definition is recorded and the batch carries on; [`Definer::generate`]
//! then writes the facade and the package `mod.rs` and reports every failure.

use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

use quote::quote;
use serde::Deserialize;
use tracing::{info, warn};

use crate::codegen::naming::{class_name, new_id, snake_case};
use crate::codegen::{
    CodeTarget, FacadeGenerator, GeneratedType, Method, MethodReturn, Parameter,
    QueryTypeGenerator, TupleTypeGenerator, TypeGenerator, UpdateTypeGenerator,
    ValueOfTypeGenerator, destroy_type, writer,
};
use crate::database::{Database, caller_location};
use crate::error::SqlTypegenError;
use crate::introspect::{column_descriptors, obtain_type_of_first_column};
use crate::parametrise::parametrise;
use crate::results::ColumnDescriptor;
use crate::sqlite::sqlite_extract_value;
use crate::types::{DbValue, HostType};

/// Where and how a [`Definer`] writes its output.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DefinerOptions {
    pub output_dir: PathBuf,
    /// `::`-separated module path of the generated package
    pub package: String,
    /// Path generated code uses to reach this library
    pub runtime_crate: String,
    pub facade_name: String,
}

impl Default for DefinerOptions {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("src"),
            package: "generated".to_string(),
            runtime_crate: "sql_typegen".to_string(),
            facade_name: "DatabaseAbstractionLayer".to_string(),
        }
    }
}

impl DefinerOptions {
    #[must_use]
    pub fn new(output_dir: impl Into<PathBuf>, package: impl Into<String>) -> Self {
        Self {
            output_dir: output_dir.into(),
            package: package.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn runtime_crate(mut self, runtime_crate: impl Into<String>) -> Self {
        self.runtime_crate = runtime_crate.into();
        self
    }

    #[must_use]
    pub fn facade_name(mut self, facade_name: impl Into<String>) -> Self {
        self.facade_name = facade_name.into();
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DefineQueryResult {
    pub tuple: GeneratedType,
    pub query: GeneratedType,
    pub columns: Vec<ColumnDescriptor>,
    /// Facade methods added for this query.
    pub methods: Vec<Method>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DefineUpdateResult {
    pub update: GeneratedType,
    pub method: Method,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DefineValueOfResult {
    pub value_of: GeneratedType,
    pub host_type: HostType,
    pub method: Method,
}

/// A definition that failed; its error was also returned to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatementFailure {
    pub name: String,
    pub error: String,
}

/// Outcome of a whole batch.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchReport {
    pub generated: Vec<GeneratedType>,
    pub failures: Vec<StatementFailure>,
}

impl BatchReport {
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    /// # Errors
    /// Returns `SqlTypegenError::GenerationError` listing every failed definition.
    pub fn into_result(self) -> Result<Vec<GeneratedType>, SqlTypegenError> {
        if self.failures.is_empty() {
            return Ok(self.generated);
        }
        let summary = self
            .failures
            .iter()
            .map(|f| format!("{}: {}", f.name, f.error))
            .collect::<Vec<_>>()
            .join("; ");
        Err(SqlTypegenError::GenerationError(format!(
            "{} definition(s) failed: {summary}",
            self.failures.len()
        )))
    }
}

/// Column metadata read from a probe run.
struct Probe {
    sql: String,
    parameters: Vec<Parameter>,
    columns: Vec<ColumnDescriptor>,
    first_type: Option<HostType>,
}

/// Generates typed wrappers for a batch of statements.
///
/// ```rust,no_run
/// # use sql_typegen::prelude::*;
/// # fn demo(db: &Database) -> Result<(), SqlTypegenError> {
/// let mut definer = Definer::new(db, DefinerOptions::new("src", "db::generated"))?;
/// definer.purge_code_directory()?;
/// definer.define_table("$$orders")?;
/// definer.define_value_of("CountOrders", "SELECT COUNT(*) FROM $$orders", vec![])?;
/// definer.generate()?.into_result()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Definer<'db> {
    database: &'db Database,
    target: CodeTarget,
    facade_name: String,
    facade: FacadeGenerator,
    /// class name => statement that claimed it
    classes: BTreeMap<String, String>,
    /// file stem => class name
    stems: BTreeMap<String, String>,
    generated: Vec<GeneratedType>,
    failures: Vec<StatementFailure>,
}

impl<'db> Definer<'db> {
    /// # Errors
    /// Returns `SqlTypegenError::ConfigError` if the package or runtime path is invalid.
    pub fn new(database: &'db Database, options: DefinerOptions) -> Result<Self, SqlTypegenError> {
        let target = CodeTarget::new(
            options.output_dir,
            &options.package,
            &options.runtime_crate,
        )?;
        Ok(Self {
            database,
            target,
            facade: FacadeGenerator::new(options.facade_name.clone()),
            facade_name: options.facade_name,
            classes: BTreeMap::new(),
            stems: BTreeMap::new(),
            generated: Vec::new(),
            failures: Vec::new(),
        })
    }

    #[must_use]
    pub fn target(&self) -> &CodeTarget {
        &self.target
    }

    #[must_use]
    pub fn failures(&self) -> &[StatementFailure] {
        &self.failures
    }

    /// Generate a tuple type and a query type for `sql`.
    ///
    /// # Errors
    /// Returns `SqlTypegenError` if the statement cannot be probed, a derived name
    /// collides, or a file cannot be written. The failure is also recorded for
    /// [`Definer::generate`].
    #[track_caller]
    pub fn define_query(
        &mut self,
        name: &str,
        sql: &str,
        arguments: Vec<DbValue>,
    ) -> Result<DefineQueryResult, SqlTypegenError> {
        let location = caller_location();
        let outcome = self.query_definition(name, None, sql, &arguments, &location);
        self.record(name, outcome)
    }

    /// [`Definer::define_query`] for rows of a single table, adding `query_for_update`.
    ///
    /// # Errors
    /// See [`Definer::define_query`].
    #[track_caller]
    pub fn define_query_for_table(
        &mut self,
        name: &str,
        table: &str,
        sql: &str,
        arguments: Vec<DbValue>,
    ) -> Result<DefineQueryResult, SqlTypegenError> {
        let location = caller_location();
        let outcome = self.query_definition(name, Some(table), sql, &arguments, &location);
        self.record(name, outcome)
    }

    /// All rows of `table`, named after the table without its `$$` prefix marker.
    ///
    /// # Errors
    /// See [`Definer::define_query`].
    #[track_caller]
    pub fn define_table(&mut self, table: &str) -> Result<DefineQueryResult, SqlTypegenError> {
        self.define_table_where(table, "", Vec::new())
    }

    /// Rows of `table` matching `clause` (SQL after `WHERE`, may be empty).
    ///
    /// # Errors
    /// See [`Definer::define_query`].
    #[track_caller]
    pub fn define_table_where(
        &mut self,
        table: &str,
        clause: &str,
        arguments: Vec<DbValue>,
    ) -> Result<DefineQueryResult, SqlTypegenError> {
        let location = caller_location();
        let logical = table.replace("$$", "");
        let sql = if clause.trim().is_empty() {
            format!("SELECT * FROM {table}")
        } else {
            format!("SELECT * FROM {table} WHERE {clause}")
        };
        let outcome = self.query_definition(&logical, Some(table), &sql, &arguments, &location);
        self.record(&logical, outcome)
    }

    /// Generate an update type; the statement is executed and rolled back.
    ///
    /// # Errors
    /// See [`Definer::define_query`].
    #[track_caller]
    pub fn define_update(
        &mut self,
        name: &str,
        sql: &str,
        arguments: Vec<DbValue>,
    ) -> Result<DefineUpdateResult, SqlTypegenError> {
        let location = caller_location();
        let outcome = self.update_definition(name, sql, &arguments, &location);
        self.record(name, outcome)
    }

    /// Generate a single-value type typed after the statement's first column.
    ///
    /// # Errors
    /// See [`Definer::define_query`].
    #[track_caller]
    pub fn define_value_of(
        &mut self,
        name: &str,
        sql: &str,
        arguments: Vec<DbValue>,
    ) -> Result<DefineValueOfResult, SqlTypegenError> {
        let location = caller_location();
        let outcome = self.value_of_definition(name, sql, &arguments, &location);
        self.record(name, outcome)
    }

    /// Delete every generated file in the package directory. Returns how many were removed.
    ///
    /// Hand-written files are left alone.
    ///
    /// # Errors
    /// Returns `SqlTypegenError::IoError` if the directory cannot be read or a file removed.
    pub fn purge_code_directory(&self) -> Result<usize, SqlTypegenError> {
        let dir = self.target.package_dir();
        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(0),
            Err(e) => return Err(e.into()),
        };
        let mut removed = 0;
        for entry in entries {
            let path = entry?.path();
            let is_source = path.extension().is_some_and(|ext| ext == "rs");
            if is_source && writer::is_generated(&path) && writer::remove(&path)? {
                removed += 1;
            }
        }
        info!(dir = %dir.display(), removed, "purged generated code");
        Ok(removed)
    }

    /// Delete the generated file of one type.
    ///
    /// # Errors
    /// Returns `SqlTypegenError::IoError` if the file exists but cannot be removed.
    pub fn destroy(&self, class_name: &str) -> Result<bool, SqlTypegenError> {
        destroy_type(&self.target, class_name)
    }

    /// Write the facade type aggregating every successful definition so far.
    ///
    /// # Errors
    /// Returns `SqlTypegenError::NameCollision` if `class_name` is taken by a
    /// generated type, or any rendering or write failure.
    pub fn emit_database_abstraction_layer(
        &mut self,
        class_name: &str,
    ) -> Result<GeneratedType, SqlTypegenError> {
        if let Some(existing) = self.classes.get(class_name) {
            return Err(SqlTypegenError::NameCollision {
                name: class_name.to_string(),
                existing: existing.clone(),
            });
        }
        let mut facade = FacadeGenerator::new(class_name);
        for method in self.facade.methods() {
            facade.add_method(method.clone())?;
        }
        facade.generate(&self.target)
    }

    /// Write the facade and the package `mod.rs`, and report the batch.
    ///
    /// # Errors
    /// Returns `SqlTypegenError` if the facade or `mod.rs` cannot be written.
    /// Failed definitions do not make this fail; see [`BatchReport::is_success`].
    pub fn generate(&mut self) -> Result<BatchReport, SqlTypegenError> {
        let facade_name = self.facade_name.clone();
        let facade = self.emit_database_abstraction_layer(&facade_name)?;
        let mut modules: BTreeMap<String, String> = self
            .generated
            .iter()
            .map(|g| (CodeTarget::file_stem(&g.class_name), g.class_name.clone()))
            .collect();
        modules.insert(CodeTarget::file_stem(&facade.class_name), facade.class_name.clone());
        self.write_mod_file(&modules)?;

        let mut generated = self.generated.clone();
        generated.push(facade);
        info!(
            package = self.target.package(),
            types = generated.len(),
            failures = self.failures.len(),
            "generation finished"
        );
        Ok(BatchReport {
            generated,
            failures: self.failures.clone(),
        })
    }

    fn write_mod_file(&self, modules: &BTreeMap<String, String>) -> Result<(), SqlTypegenError> {
        let stems: Vec<_> = modules.keys().map(|stem| new_id(stem)).collect();
        let classes: Vec<_> = modules.values().map(|class| new_id(class)).collect();
        let tokens = quote! {
            #(pub mod #stems;)*

            #(pub use #stems::#classes;)*
        };
        let path = self.target.package_dir().join("mod.rs");
        writer::write_if_changed(&path, &writer::render(tokens)?)?;
        Ok(())
    }

    fn record<R>(
        &mut self,
        name: &str,
        outcome: Result<R, SqlTypegenError>,
    ) -> Result<R, SqlTypegenError> {
        if let Err(e) = &outcome {
            warn!(statement = name, error = %e, "definition failed");
            self.failures.push(StatementFailure {
                name: name.to_string(),
                error: e.to_string(),
            });
        }
        outcome
    }

    fn query_definition(
        &mut self,
        name: &str,
        table: Option<&str>,
        sql: &str,
        arguments: &[DbValue],
        location: &str,
    ) -> Result<DefineQueryResult, SqlTypegenError> {
        let query_class = class_name(name)?;
        let tuple_class = format!("{query_class}Tuple");
        let probe = self.probe(sql, arguments, false, location)?;
        self.check_claim(&[&query_class, &tuple_class])?;

        let mut query = QueryTypeGenerator::new(
            query_class.clone(),
            tuple_class.clone(),
            probe.sql.clone(),
            probe.parameters.clone(),
        );
        if let Some(table) = table {
            query = query.for_table(table);
        }
        let method_name = snake_case(&query_class);
        let mut methods = vec![Method {
            name: method_name.clone(),
            qualifier: "Query".to_string(),
            parameters: probe.parameters.clone(),
            returns: MethodReturn::Tuples {
                tuple: tuple_class.clone(),
            },
            delegate_type: query_class.clone(),
            delegate_fn: "query".to_string(),
        }];
        if table.is_some() {
            methods.push(Method {
                name: format!("{method_name}_for_update"),
                qualifier: "Updatable query".to_string(),
                parameters: probe.parameters.clone(),
                returns: MethodReturn::UpdatableTuples {
                    tuple: tuple_class.clone(),
                },
                delegate_type: query_class.clone(),
                delegate_fn: "query_for_update".to_string(),
            });
        }
        self.check_methods(&methods)?;

        let tuple = TupleTypeGenerator::new(tuple_class.clone(), probe.columns.clone())
            .generate(&self.target)?;
        let query = query.generate(&self.target)?;
        self.claim(name, &[&query_class, &tuple_class]);
        self.generated.push(tuple.clone());
        self.generated.push(query.clone());
        for method in &methods {
            self.facade.add_method(method.clone())?;
        }
        Ok(DefineQueryResult {
            tuple,
            query,
            columns: probe.columns,
            methods,
        })
    }

    fn update_definition(
        &mut self,
        name: &str,
        sql: &str,
        arguments: &[DbValue],
        location: &str,
    ) -> Result<DefineUpdateResult, SqlTypegenError> {
        let update_class = class_name(name)?;
        let probe = self.probe(sql, arguments, true, location)?;
        self.check_claim(&[&update_class])?;
        let method = Method {
            name: snake_case(&update_class),
            qualifier: "Update".to_string(),
            parameters: probe.parameters.clone(),
            returns: MethodReturn::RowCount,
            delegate_type: update_class.clone(),
            delegate_fn: "update".to_string(),
        };
        self.check_methods(std::slice::from_ref(&method))?;

        let update = UpdateTypeGenerator::new(update_class.clone(), probe.sql, probe.parameters)
            .generate(&self.target)?;
        self.claim(name, &[&update_class]);
        self.generated.push(update.clone());
        self.facade.add_method(method.clone())?;
        Ok(DefineUpdateResult { update, method })
    }

    fn value_of_definition(
        &mut self,
        name: &str,
        sql: &str,
        arguments: &[DbValue],
        location: &str,
    ) -> Result<DefineValueOfResult, SqlTypegenError> {
        let value_class = class_name(name)?;
        let probe = self.probe(sql, arguments, false, location)?;
        let host_type = probe.first_type.unwrap_or(HostType::Any);
        self.check_claim(&[&value_class])?;
        let method = Method {
            name: snake_case(&value_class),
            qualifier: "Value of".to_string(),
            parameters: probe.parameters.clone(),
            returns: MethodReturn::Value(host_type),
            delegate_type: value_class.clone(),
            delegate_fn: "value_of".to_string(),
        };
        self.check_methods(std::slice::from_ref(&method))?;

        let value_of = ValueOfTypeGenerator::new(
            value_class.clone(),
            probe.sql,
            probe.parameters,
            host_type,
        )
        .generate(&self.target)?;
        self.claim(name, &[&value_class]);
        self.generated.push(value_of.clone());
        self.facade.add_method(method.clone())?;
        Ok(DefineValueOfResult {
            value_of,
            host_type,
            method,
        })
    }

    /// Run `sql` once in a rolled-back transaction and read its result metadata.
    fn probe(
        &self,
        sql: &str,
        arguments: &[DbValue],
        is_update: bool,
        location: &str,
    ) -> Result<Probe, SqlTypegenError> {
        let parametrised = parametrise(sql)?;
        if parametrised.parameter_names.len() != arguments.len() {
            return Err(SqlTypegenError::ParameterError(format!(
                "{} parameter(s) named but {} sample argument(s) supplied: {sql}",
                parametrised.parameter_names.len(),
                arguments.len()
            )));
        }
        let parameters = parametrised
            .parameter_names
            .iter()
            .zip(arguments)
            .map(|(name, value)| Parameter {
                name: name.clone(),
                host_type: value.host_type(),
            })
            .collect();

        let database = self.database;
        let (columns, first_type) = database.dry_run(|xact| {
            let mut prepared = database.prepare(xact.connection(), &parametrised.sql, arguments)?;
            let customisations = database.customisations();
            if is_update {
                prepared.stmt.execute(prepared.params.as_params())?;
                database.emit(location, &prepared.sql);
                return Ok((Vec::new(), None));
            }
            let columns = column_descriptors(&prepared.stmt, customisations);
            let first_value = {
                let mut rows = prepared.stmt.query(prepared.params.as_params())?;
                match rows.next()? {
                    Some(row) if !columns.is_empty() => Some(sqlite_extract_value(row, 0)?),
                    _ => None,
                }
            };
            database.emit(location, &prepared.sql);
            let first_type = if columns.is_empty() {
                None
            } else {
                Some(obtain_type_of_first_column(
                    &prepared.stmt,
                    customisations,
                    first_value.as_ref(),
                )?)
            };
            Ok((columns, first_type))
        })?;

        Ok(Probe {
            sql: parametrised.sql,
            parameters,
            columns,
            first_type,
        })
    }

    /// Fail if any of `classes`, or its file stem, is already taken.
    fn check_claim(&self, classes: &[&str]) -> Result<(), SqlTypegenError> {
        for class in classes {
            if *class == self.facade_name {
                return Err(SqlTypegenError::NameCollision {
                    name: (*class).to_string(),
                    existing: "the database abstraction layer".to_string(),
                });
            }
            if let Some(existing) = self.classes.get(*class) {
                return Err(SqlTypegenError::NameCollision {
                    name: (*class).to_string(),
                    existing: existing.clone(),
                });
            }
            let stem = CodeTarget::file_stem(class);
            if let Some(existing) = self.stems.get(&stem) {
                return Err(SqlTypegenError::NameCollision {
                    name: (*class).to_string(),
                    existing: format!("{existing} (file {stem}.rs)"),
                });
            }
        }
        Ok(())
    }

    /// Reserve class names and their file stems for `statement`. Call after
    /// [`Definer::check_claim`] and once the types have been written.
    fn claim(&mut self, statement: &str, classes: &[&str]) {
        for class in classes {
            self.classes.insert((*class).to_string(), statement.to_string());
            self.stems
                .insert(CodeTarget::file_stem(class), (*class).to_string());
        }
    }

    fn check_methods(&self, methods: &[Method]) -> Result<(), SqlTypegenError> {
        for method in methods {
            if let Some(existing) = self.facade.methods().iter().find(|m| m.name == method.name) {
                return Err(SqlTypegenError::NameCollision {
                    name: method.name.clone(),
                    existing: existing.delegate_type.clone(),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn options_deserialize_with_defaults() {
        let options: DefinerOptions =
            serde_json::from_str(r#"{"package": "db::generated"}"#).unwrap();
        assert_eq!(options.package, "db::generated");
        assert_eq!(options.output_dir, PathBuf::from("src"));
        assert_eq!(options.runtime_crate, "sql_typegen");
        assert_eq!(options.facade_name, "DatabaseAbstractionLayer");
    }

    #[test]
    fn report_lists_failures() {
        let report = BatchReport {
            generated: Vec::new(),
            failures: vec![StatementFailure {
                name: "Broken".to_string(),
                error: "no such table".to_string(),
            }],
        };
        assert!(!report.is_success());
        let err = report.into_result().unwrap_err();
        assert!(err.to_string().contains("Broken: no such table"));
    }
}
