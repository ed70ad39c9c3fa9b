//! Macros for reducing boilerplate when defining resources
//!
//! A console resource is a struct with the shared fields (`id`, `name`,
//! `status`, `createdAt`) plus its own fields, a form carrying everything but
//! `id` and `createdAt`, and the [`Resource`](crate::core::entity::Resource)
//! impl tying them together. [`impl_resource!`](crate::impl_resource)
//! generates all three.

/// Define a resource struct, its form and the `Resource` implementation
///
/// Each specific field is declared as `"jsonKey" => rust_name: Type`; field
/// attributes (e.g. `#[validate(...)]`) are placed on the form field. The
/// JSON key is also the name filters and sorting use for the field.
///
/// An optional trailing `|rules| expr` extends the shared form rules
/// (non-blank name, status from the allowed list).
///
/// # Example
///
/// ```rust,ignore
/// use console::prelude::*;
///
/// impl_resource!(
///     Branch,
///     BranchForm,
///     "branch",
///     "branches",
///     ["active", "inactive"],
///     ["name", "city"],
///     {
///         #[validate(length(min = 1, message = "city is required"))]
///         "city" => city: String,
///         "openedAt" => opened_at: Option<String>,
///     },
///     |rules| rules.rule("city", validators::string_length(1, 64))
/// );
///
/// let branch = Branch::from_form("b-1".into(), Utc::now(), form);
/// assert_eq!(branch.field_value("city"), Some(FieldValue::from("Nukus")));
/// ```
#[macro_export]
macro_rules! impl_resource {
    (
        $type:ident,
        $form:ident,
        $name:literal,
        $collection:literal,
        [ $( $status:literal ),* $(,)? ],
        [ $( $search:literal ),* $(,)? ],
        {
            $(
                $( #[$field_meta:meta] )*
                $key:literal => $field:ident : $field_type:ty
            ),* $(,)?
        }
        $(, |$rules:ident| $extra_rules:expr )?
        $(,)?
    ) => {
        #[derive(Debug, Clone, PartialEq, ::serde::Serialize, ::serde::Deserialize)]
        #[serde(rename_all = "camelCase")]
        pub struct $type {
            /// Unique identifier
            pub id: String,

            /// Display name
            pub name: String,

            /// Current status, one of the resource's allowed statuses
            pub status: String,

            $(
                #[serde(rename = $key)]
                pub $field: $field_type,
            )*

            /// When this resource was created
            pub created_at: ::chrono::DateTime<::chrono::Utc>,
        }

        /// Form data submitted on create and update
        #[derive(Debug, Clone, PartialEq, ::serde::Serialize, ::serde::Deserialize, ::validator::Validate)]
        #[serde(rename_all = "camelCase")]
        pub struct $form {
            #[validate(length(max = 120, message = "name must not exceed 120 characters"))]
            pub name: String,

            pub status: String,

            $(
                $( #[$field_meta] )*
                #[serde(rename = $key)]
                pub $field: $field_type,
            )*
        }

        impl $crate::core::entity::Resource for $type {
            type Form = $form;

            fn resource_name() -> &'static str {
                $name
            }

            fn collection_name() -> &'static str {
                $collection
            }

            fn statuses() -> &'static [&'static str] {
                &[ $( $status ),* ]
            }

            fn search_fields() -> &'static [&'static str] {
                &[ $( $search ),* ]
            }

            fn id(&self) -> &str {
                &self.id
            }

            fn name(&self) -> &str {
                &self.name
            }

            fn status(&self) -> &str {
                &self.status
            }

            fn created_at(&self) -> ::chrono::DateTime<::chrono::Utc> {
                self.created_at
            }

            fn field_value(&self, field: &str) -> Option<$crate::core::field::FieldValue> {
                match field {
                    "id" => Some(self.id.clone().into()),
                    "name" => Some(self.name.clone().into()),
                    "status" => Some(self.status.clone().into()),
                    "createdAt" | "created_at" => Some(self.created_at.into()),
                    $(
                        f if f == $key || f == stringify!($field) => {
                            Some(self.$field.clone().into())
                        }
                    )*
                    _ => None,
                }
            }

            fn validate(form: &$form) -> $crate::core::error::ConsoleResult<()> {
                let rules = $crate::core::validation::FormRules::common(Self::statuses());
                $(
                    let $rules = rules;
                    let rules = $extra_rules;
                )?
                $crate::core::validation::validate_form(form, &rules)
            }

            fn from_form(
                id: String,
                created_at: ::chrono::DateTime<::chrono::Utc>,
                form: $form,
            ) -> Self {
                Self {
                    id,
                    name: form.name,
                    status: form.status,
                    $( $field: form.$field, )*
                    created_at,
                }
            }
        }

        impl $type {
            /// Form pre-filled with this resource's current values
            pub fn to_form(&self) -> $form {
                $form {
                    name: self.name.clone(),
                    status: self.status.clone(),
                    $( $field: self.$field.clone(), )*
                }
            }
        }
    };
}
