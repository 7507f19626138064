use std::collections::BTreeMap;

use proc_macro2::TokenStream;
use quote::quote;

use super::naming::{member_ident, new_id, type_ident};
use super::sql_type::scalar_type;
use super::{CodeTarget, Method, MethodReturn, TypeGenerator, TypeKind, parameter_tokens};
use crate::error::SqlTypegenError;

/// Emits the database abstraction layer: one struct borrowing a `Database`
/// with a method per defined statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FacadeGenerator {
    class_name: String,
    methods: Vec<Method>,
}

impl FacadeGenerator {
    #[must_use]
    pub fn new(class_name: impl Into<String>) -> Self {
        Self {
            class_name: class_name.into(),
            methods: Vec::new(),
        }
    }

    /// # Errors
    /// Returns `SqlTypegenError::NameCollision` if a method of that name already exists.
    pub fn add_method(&mut self, method: Method) -> Result<(), SqlTypegenError> {
        if let Some(existing) = self.methods.iter().find(|m| m.name == method.name) {
            return Err(SqlTypegenError::NameCollision {
                name: method.name,
                existing: format!("{}::{}", existing.delegate_type, existing.delegate_fn),
            });
        }
        self.methods.push(method);
        Ok(())
    }

    #[must_use]
    pub fn methods(&self) -> &[Method] {
        &self.methods
    }

    fn method_tokens(method: &Method, rt: &syn::Path) -> Result<TokenStream, SqlTypegenError> {
        let name = member_ident(&method.name);
        let delegate = type_ident(&method.delegate_type)?;
        let delegate_fn = new_id(&method.delegate_fn);
        let (idents, decls) = parameter_tokens(&method.parameters, rt)?;
        let returns = match &method.returns {
            MethodReturn::Tuples { tuple } => {
                let tuple = type_ident(tuple)?;
                quote!(#rt::TupleList<super::#tuple>)
            }
            MethodReturn::UpdatableTuples { tuple } => {
                let tuple = type_ident(tuple)?;
                quote!(Vec<#rt::UpdatableTuple<'db, super::#tuple>>)
            }
            MethodReturn::RowCount => quote!(usize),
            MethodReturn::Value(host_type) => {
                let value = scalar_type(*host_type, rt);
                quote!(Option<#value>)
            }
        };
        let doc = format!(
            "{} through [`super::{}::{}`].",
            method.qualifier, method.delegate_type, method.delegate_fn
        );
        Ok(quote! {
            #[doc = #doc]
            ///
            /// # Errors
            /// Returns `SqlTypegenError` if the statement fails.
            #[track_caller]
            pub fn #name(&self, #(#decls),*) -> Result<#returns, #rt::SqlTypegenError> {
                super::#delegate::#delegate_fn(self.database, #(#idents),*)
            }
        })
    }
}

impl TypeGenerator for FacadeGenerator {
    const KIND: TypeKind = TypeKind::Facade;

    fn class_name(&self) -> &str {
        &self.class_name
    }

    fn tokens(&self, target: &CodeTarget) -> Result<TokenStream, SqlTypegenError> {
        let rt = target.runtime();
        let class = type_ident(&self.class_name)?;

        // Sorted so the file does not depend on definition order.
        let mut sorted = BTreeMap::new();
        for method in &self.methods {
            sorted.insert(method.name.as_str(), method);
        }
        let methods = sorted
            .values()
            .map(|method| Self::method_tokens(method, rt))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(quote! {
            /// Every generated statement as a method on one handle.
            #[derive(Debug, Clone, Copy)]
            pub struct #class<'db> {
                database: &'db #rt::Database,
            }

            impl<'db> #class<'db> {
                #[must_use]
                pub fn new(database: &'db #rt::Database) -> Self {
                    Self { database }
                }

                #[must_use]
                pub fn database(&self) -> &'db #rt::Database {
                    self.database
                }

                #(#methods)*
            }
        })
    }
}
