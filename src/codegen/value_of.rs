use proc_macro2::TokenStream;
use quote::quote;

use super::naming::type_ident;
use super::sql_type::scalar_type;
use super::{CodeTarget, Parameter, TypeGenerator, TypeKind, parameter_tokens, statement_tokens};
use crate::error::SqlTypegenError;
use crate::types::HostType;

/// Emits a single-value query type; the value type comes from the first column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValueOfTypeGenerator {
    class_name: String,
    sql: String,
    parameters: Vec<Parameter>,
    host_type: HostType,
}

impl ValueOfTypeGenerator {
    #[must_use]
    pub fn new(
        class_name: impl Into<String>,
        sql: impl Into<String>,
        parameters: Vec<Parameter>,
        host_type: HostType,
    ) -> Self {
        Self {
            class_name: class_name.into(),
            sql: sql.into(),
            parameters,
            host_type,
        }
    }

    #[must_use]
    pub fn host_type(&self) -> HostType {
        self.host_type
    }

    #[must_use]
    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }
}

impl TypeGenerator for ValueOfTypeGenerator {
    const KIND: TypeKind = TypeKind::ValueOf;

    fn class_name(&self) -> &str {
        &self.class_name
    }

    fn tokens(&self, target: &CodeTarget) -> Result<TokenStream, SqlTypegenError> {
        let rt = target.runtime();
        let class = type_ident(&self.class_name)?;
        let (idents, decls) = parameter_tokens(&self.parameters, rt)?;
        let value = scalar_type(self.host_type, rt);
        let doc = format!("Single {} value: `{}`", self.host_type, self.sql);
        let statement = statement_tokens(&class, &doc, &self.sql, &idents, &decls, rt);

        Ok(quote! {
            #statement

            impl #class {
                /// `None` when no row is returned or the value is NULL.
                ///
                /// # Errors
                /// Returns `SqlTypegenError` if the query fails or the value has the wrong type.
                #[track_caller]
                pub fn value_of(
                    database: &#rt::Database,
                    #(#decls),*
                ) -> Result<Option<#value>, #rt::SqlTypegenError> {
                    database.value_of(&Self::new(#(#idents),*))
                }

                /// # Errors
                /// Returns `SqlTypegenError` if the query fails or the value has the wrong type.
                #[track_caller]
                pub fn value_of_with(
                    xact: &#rt::Xact<'_>,
                    #(#decls),*
                ) -> Result<Option<#value>, #rt::SqlTypegenError> {
                    xact.value_of(&Self::new(#(#idents),*))
                }
            }

            impl #rt::ValueOfStatement for #class {
                type Value = #value;
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn value_type_follows_host_type() {
        let generator = ValueOfTypeGenerator::new(
            "CountOrders",
            "SELECT COUNT(*) FROM $$orders",
            Vec::new(),
            HostType::Int64,
        );
        let target = CodeTarget::new("out", "generated", "sql_typegen").unwrap();
        let text = generator.source_text(&target).unwrap();
        assert!(text.contains("type Value = i64;"));
        assert!(text.contains("Option<i64>"));
        assert!(text.contains("pub fn new() -> Self"));
    }
}
