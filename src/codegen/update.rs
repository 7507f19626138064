use proc_macro2::TokenStream;
use quote::quote;

use super::naming::type_ident;
use super::{CodeTarget, Parameter, TypeGenerator, TypeKind, parameter_tokens, statement_tokens};
use crate::error::SqlTypegenError;

/// Emits an update type returning the affected-row count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateTypeGenerator {
    class_name: String,
    sql: String,
    parameters: Vec<Parameter>,
}

impl UpdateTypeGenerator {
    #[must_use]
    pub fn new(
        class_name: impl Into<String>,
        sql: impl Into<String>,
        parameters: Vec<Parameter>,
    ) -> Self {
        Self {
            class_name: class_name.into(),
            sql: sql.into(),
            parameters,
        }
    }

    #[must_use]
    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }
}

impl TypeGenerator for UpdateTypeGenerator {
    const KIND: TypeKind = TypeKind::Update;

    fn class_name(&self) -> &str {
        &self.class_name
    }

    fn tokens(&self, target: &CodeTarget) -> Result<TokenStream, SqlTypegenError> {
        let rt = target.runtime();
        let class = type_ident(&self.class_name)?;
        let (idents, decls) = parameter_tokens(&self.parameters, rt)?;
        let doc = format!("`{}`", self.sql);
        let statement = statement_tokens(&class, &doc, &self.sql, &idents, &decls, rt);

        Ok(quote! {
            #statement

            impl #class {
                /// Returns the number of affected rows.
                ///
                /// # Errors
                /// Returns `SqlTypegenError` if the statement cannot be executed.
                #[track_caller]
                pub fn update(
                    database: &#rt::Database,
                    #(#decls),*
                ) -> Result<usize, #rt::SqlTypegenError> {
                    database.update(&Self::new(#(#idents),*))
                }

                /// # Errors
                /// Returns `SqlTypegenError` if the statement cannot be executed.
                #[track_caller]
                pub fn update_with(
                    xact: &#rt::Xact<'_>,
                    #(#decls),*
                ) -> Result<usize, #rt::SqlTypegenError> {
                    xact.update(&Self::new(#(#idents),*))
                }
            }

            impl #rt::UpdateStatement for #class {}
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::HostType;

    #[test]
    fn parameters_keep_declaration_order() {
        let generator = UpdateTypeGenerator::new(
            "SetTotal",
            "UPDATE $$orders SET total = ? WHERE id = ?",
            vec![
                Parameter {
                    name: "total".to_string(),
                    host_type: HostType::Float64,
                },
                Parameter {
                    name: "id".to_string(),
                    host_type: HostType::Int64,
                },
            ],
        );
        let target = CodeTarget::new("out", "generated", "sql_typegen").unwrap();
        let text = generator.source_text(&target).unwrap();
        assert!(text.contains("pub fn new(total: f64, id: i64) -> Self"));
        assert!(text.contains("impl sql_typegen::UpdateStatement for SetTotal {}"));
    }
}
