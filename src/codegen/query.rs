use proc_macro2::TokenStream;
use quote::quote;

use super::naming::type_ident;
use super::{CodeTarget, Parameter, TypeGenerator, TypeKind, parameter_tokens, statement_tokens};
use crate::error::SqlTypegenError;

/// Emits a query type bound to one tuple type.
///
/// The generated type carries the SQL text as `SQL`, a constructor taking the
/// parameters in declaration order, and `query`/`query_with`/`query_first`
/// helpers. When the rows come from a single table, `query_for_update` is
/// emitted as well.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryTypeGenerator {
    class_name: String,
    tuple_class: String,
    sql: String,
    parameters: Vec<Parameter>,
    table: Option<String>,
}

impl QueryTypeGenerator {
    #[must_use]
    pub fn new(
        class_name: impl Into<String>,
        tuple_class: impl Into<String>,
        sql: impl Into<String>,
        parameters: Vec<Parameter>,
    ) -> Self {
        Self {
            class_name: class_name.into(),
            tuple_class: tuple_class.into(),
            sql: sql.into(),
            parameters,
            table: None,
        }
    }

    /// Bind the query to `table` so its rows can be written back.
    #[must_use]
    pub fn for_table(mut self, table: impl Into<String>) -> Self {
        self.table = Some(table.into());
        self
    }

    #[must_use]
    pub fn tuple_class(&self) -> &str {
        &self.tuple_class
    }

    #[must_use]
    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    #[must_use]
    pub fn table(&self) -> Option<&str> {
        self.table.as_deref()
    }
}

impl TypeGenerator for QueryTypeGenerator {
    const KIND: TypeKind = TypeKind::Query;

    fn class_name(&self) -> &str {
        &self.class_name
    }

    fn tokens(&self, target: &CodeTarget) -> Result<TokenStream, SqlTypegenError> {
        let rt = target.runtime();
        let class = type_ident(&self.class_name)?;
        let tuple = type_ident(&self.tuple_class)?;
        let (idents, decls) = parameter_tokens(&self.parameters, rt)?;
        let doc = format!("Returns rows of [`super::{}`].", self.tuple_class);
        let statement = statement_tokens(&class, &doc, &self.sql, &idents, &decls, rt);

        let (table_fn, for_update) = match &self.table {
            Some(table) => (
                quote! {
                    fn table_name(&self) -> Option<&str> {
                        Some(#table)
                    }
                },
                quote! {
                    /// Rows that can be modified and written back to their table.
                    ///
                    /// # Errors
                    /// Returns `SqlTypegenError` if the table's key columns cannot be
                    /// resolved or the query fails.
                    #[track_caller]
                    pub fn query_for_update<'db>(
                        database: &'db #rt::Database,
                        #(#decls),*
                    ) -> Result<Vec<#rt::UpdatableTuple<'db, super::#tuple>>, #rt::SqlTypegenError> {
                        database.query_for_update(&Self::new(#(#idents),*))
                    }
                },
            ),
            None => (TokenStream::new(), TokenStream::new()),
        };

        Ok(quote! {
            #statement

            impl #class {
                /// # Errors
                /// Returns `SqlTypegenError` if the query cannot be executed.
                #[track_caller]
                pub fn query(
                    database: &#rt::Database,
                    #(#decls),*
                ) -> Result<#rt::TupleList<super::#tuple>, #rt::SqlTypegenError> {
                    database.query(&Self::new(#(#idents),*))
                }

                /// # Errors
                /// Returns `SqlTypegenError` if the query cannot be executed.
                #[track_caller]
                pub fn query_with(
                    xact: &#rt::Xact<'_>,
                    #(#decls),*
                ) -> Result<#rt::TupleList<super::#tuple>, #rt::SqlTypegenError> {
                    xact.query(&Self::new(#(#idents),*))
                }

                /// # Errors
                /// Returns `SqlTypegenError` if the query cannot be executed.
                #[track_caller]
                pub fn query_first(
                    database: &#rt::Database,
                    #(#decls),*
                ) -> Result<Option<#rt::Decoded<super::#tuple>>, #rt::SqlTypegenError> {
                    database.query_first(&Self::new(#(#idents),*))
                }

                #for_update
            }

            impl #rt::QueryStatement for #class {
                type Tuple = super::#tuple;

                #table_fn
            }
        })
    }
}
