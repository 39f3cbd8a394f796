//! Generator for action kinds.
//!
//! ```ignore
//! pipeline_action! {
//!     /// Runs commands on a remote host over SSH.
//!     SshCommand {
//!         args: SshCommandArgs,
//!         state: SshCommandState,
//!         props: SshCommandProps,
//!         type_token: "conveyor:pipeline/sshCommand:SshCommand",
//!         kind: "SSH_COMMAND",
//!         replace_on_change: false,
//!         required {
//!             host: String,
//!         }
//!         optional {
//!             login: String,
//!         }
//!     }
//! }
//! ```
//!
//! The fields every kind shares (`project_name`, `pipeline_id`, `name`,
//! trigger settings, retries, variables, permissions) are added here.

macro_rules! pipeline_action {
    (
        @expand
        $(#[$meta:meta])*
        $name:ident, $args:ident, $state:ident, $props:ident,
        $token:literal, $kind:literal, $replace:literal,
        required { $( $(#[$rmeta:meta])* $rfield:ident : $rty:ty ),* $(,)? }
        optional { $( $(#[$ometa:meta])* $ofield:ident : $oty:ty ),* $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone)]
        pub struct $name {
            resource: ::conveyor_core::CustomResource,
        }

        #[doc = concat!("Persisted attributes of a [`", stringify!($name), "`] action.")]
        #[derive(Debug, Clone, Default, PartialEq, ::serde::Serialize, ::serde::Deserialize)]
        #[serde(deny_unknown_fields)]
        pub struct $state {
            $(
                $(#[$rmeta])*
                #[serde(default, skip_serializing_if = "Option::is_none")]
                pub $rfield: Option<$rty>,
            )*
            $(
                $(#[$ometa])*
                #[serde(default, skip_serializing_if = "Option::is_none")]
                pub $ofield: Option<$oty>,
            )*
            /// Identifier the control plane assigned to the action.
            #[serde(default, skip_serializing_if = "Option::is_none")]
            pub action_id: Option<i64>,
            /// Canonical API url of the action.
            #[serde(default, skip_serializing_if = "Option::is_none")]
            pub url: Option<String>,
            /// Web url of the action.
            #[serde(default, skip_serializing_if = "Option::is_none")]
            pub html_url: Option<String>,
            /// Kind discriminator. Always overwritten on construction.
            #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
            pub kind: Option<String>,
        }

        #[doc = concat!("Creation inputs of a [`", stringify!($name), "`] action.")]
        #[derive(Debug, Clone, Default)]
        pub struct $args {
            $(
                $(#[$rmeta])*
                pub $rfield: Option<::conveyor_core::Input<$rty>>,
            )*
            $(
                $(#[$ometa])*
                pub $ofield: Option<::conveyor_core::Input<$oty>>,
            )*
        }

        impl From<$state> for $args {
            fn from(state: $state) -> Self {
                Self {
                    $( $rfield: state.$rfield.map(::conveyor_core::Input::Value), )*
                    $( $ofield: state.$ofield.map(::conveyor_core::Input::Value), )*
                }
            }
        }

        #[doc = concat!("What the control plane reports for a created [`", stringify!($name), "`] action.")]
        #[derive(Debug, Clone, PartialEq)]
        pub struct $props {
            pub action_id: i64,
            pub url: String,
            pub html_url: String,
            pub pipeline: $crate::types::PipelineRef,
            pub attributes: $state,
        }

        impl TryFrom<$state> for $props {
            type Error = ::conveyor_core::Error;

            fn try_from(state: $state) -> ::conveyor_core::Result<Self> {
                Ok(Self {
                    action_id: $crate::base::server_field(state.action_id, "action_id")?,
                    url: $crate::base::server_field(state.url.clone(), "url")?,
                    html_url: $crate::base::server_field(state.html_url.clone(), "html_url")?,
                    pipeline: $crate::types::PipelineRef::from_parts(
                        state.project_name.clone(),
                        state.pipeline_id,
                    )?,
                    attributes: state,
                })
            }
        }

        impl $name {
            /// Construct the action.
            ///
            /// Without `opts.id` every required field must be present and the
            /// first missing one is reported. With `opts.id` the existing action
            /// is adopted and nothing is required.
            pub fn new(
                ctx: &::conveyor_core::Context,
                name: &str,
                args: $args,
                opts: ::conveyor_core::ResourceOptions,
            ) -> ::conveyor_core::Result<Self> {
                if opts.id.is_none() {
                    $(
                        if args.$rfield.is_none() {
                            return Err($crate::base::missing(stringify!($rfield)));
                        }
                    )*
                }

                let mut props = ::conveyor_core::PropertyMap::new();
                $(
                    if let Some(value) = args.$rfield {
                        props.insert(
                            stringify!($rfield),
                            ::conveyor_core::PropertyValue::from_input(value)?,
                        );
                    }
                )*
                $(
                    if let Some(value) = args.$ofield {
                        props.insert(
                            stringify!($ofield),
                            ::conveyor_core::PropertyValue::from_input(value)?,
                        );
                    }
                )*
                Ok(Self::register(ctx, name, props, opts))
            }

            /// Look up an existing action by logical name and id, optionally
            /// seeded with prior state.
            pub fn get(
                ctx: &::conveyor_core::Context,
                name: &str,
                id: impl Into<::conveyor_core::Input<::conveyor_core::ResourceId>>,
                state: Option<$state>,
                opts: ::conveyor_core::ResourceOptions,
            ) -> ::conveyor_core::Result<Self> {
                let mut props = ::conveyor_core::PropertyMap::new();
                if let Some(state) = state {
                    $(
                        if let Some(value) = &state.$rfield {
                            props.insert(
                                stringify!($rfield),
                                ::conveyor_core::PropertyValue::from_value(value)?,
                            );
                        }
                    )*
                    $(
                        if let Some(value) = &state.$ofield {
                            props.insert(
                                stringify!($ofield),
                                ::conveyor_core::PropertyValue::from_value(value)?,
                            );
                        }
                    )*
                }
                Ok(Self::register(ctx, name, props, opts.with_id(id)))
            }

            fn register(
                ctx: &::conveyor_core::Context,
                name: &str,
                props: ::conveyor_core::PropertyMap,
                opts: ::conveyor_core::ResourceOptions,
            ) -> Self {
                Self {
                    resource: $crate::base::register_action(
                        ctx, $token, $kind, name, props, opts, $replace,
                    ),
                }
            }

            #[doc = concat!("Whether `resource` is a [`", stringify!($name), "`].")]
            pub fn is_instance(resource: &::conveyor_core::CustomResource) -> bool {
                resource.type_token() == $token
            }

            pub fn resource(&self) -> &::conveyor_core::CustomResource {
                &self.resource
            }

            /// Everything the control plane reported, once the action exists.
            pub fn props(&self) -> ::conveyor_core::Output<$props> {
                self.resource.outputs().try_apply(|map| {
                    let state: $state = ::serde_json::from_value(::serde_json::Value::Object(map))?;
                    $props::try_from(state)
                })
            }

            $(
                $(#[$rmeta])*
                pub fn $rfield(&self) -> ::conveyor_core::Output<$rty> {
                    self.resource.output(stringify!($rfield))
                }
            )*

            $(
                $(#[$ometa])*
                pub fn $ofield(&self) -> ::conveyor_core::Output<Option<$oty>> {
                    self.resource.output_opt(stringify!($ofield))
                }
            )*

            /// Identifier the control plane assigned to the action.
            pub fn action_id(&self) -> ::conveyor_core::Output<i64> {
                self.resource.output("action_id")
            }

            /// Canonical API url of the action.
            pub fn url(&self) -> ::conveyor_core::Output<String> {
                self.resource.output("url")
            }

            /// Web url of the action.
            pub fn html_url(&self) -> ::conveyor_core::Output<String> {
                self.resource.output("html_url")
            }

            /// The kind discriminator as stored by the control plane.
            pub fn kind(&self) -> ::conveyor_core::Output<String> {
                self.resource.output($crate::base::KIND_FIELD)
            }
        }

        impl $crate::base::PipelineAction for $name {
            const TYPE_TOKEN: &'static str = $token;
            const KIND: &'static str = $kind;
            const REQUIRED_FIELDS: &'static [&'static str] = &[$(stringify!($rfield)),*];
            const REPLACE_ON_CHANGE: bool = $replace;

            type Args = $args;
            type State = $state;

            fn create(
                ctx: &::conveyor_core::Context,
                name: &str,
                args: $args,
                opts: ::conveyor_core::ResourceOptions,
            ) -> ::conveyor_core::Result<Self> {
                Self::new(ctx, name, args, opts)
            }

            fn resource(&self) -> &::conveyor_core::CustomResource {
                &self.resource
            }

            fn is_list_field(field: &str) -> bool {
                match field {
                    $( stringify!($rfield) => <$rty as $crate::base::FieldShape>::LIST, )*
                    $( stringify!($ofield) => <$oty as $crate::base::FieldShape>::LIST, )*
                    _ => false,
                }
            }

            #[cfg(test)]
            fn sample_attributes() -> ::serde_json::Map<String, ::serde_json::Value> {
                let mut attrs = ::serde_json::Map::new();
                $(
                    attrs.insert(
                        stringify!($rfield).to_string(),
                        ::serde_json::to_value(<$rty as $crate::testing::Sample>::sample())
                            .unwrap_or_default(),
                    );
                )*
                attrs
            }
        }

        impl AsRef<::conveyor_core::CustomResource> for $name {
            fn as_ref(&self) -> &::conveyor_core::CustomResource {
                &self.resource
            }
        }

        impl TryFrom<::conveyor_core::CustomResource> for $name {
            type Error = ::conveyor_core::Error;

            fn try_from(resource: ::conveyor_core::CustomResource) -> ::conveyor_core::Result<Self> {
                if Self::is_instance(&resource) {
                    Ok(Self { resource })
                } else {
                    Err(::conveyor_core::Error::InvalidInput(format!(
                        "resource '{}' is a {}, not a {}",
                        resource.name(),
                        resource.type_token(),
                        $token
                    )))
                }
            }
        }
    };

    (
        $(#[$meta:meta])*
        $name:ident {
            args: $args:ident,
            state: $state:ident,
            props: $props:ident,
            type_token: $token:literal,
            kind: $kind:literal,
            replace_on_change: $replace:literal,
            required { $($required:tt)* }
            optional { $($optional:tt)* }
        }
    ) => {
        pipeline_action! {
            @expand
            $(#[$meta])*
            $name, $args, $state, $props, $token, $kind, $replace,
            required {
                /// Name of the project the owning pipeline belongs to.
                project_name: String,
                /// Numeric id of the owning pipeline.
                pipeline_id: i64,
                /// Display name of the action.
                name: String,
                $($required)*
            }
            optional {
                /// When the action runs: `ON_EVERY_EXECUTION` (default),
                /// `ON_FAILURE` or `ON_BACK_TO_SUCCESS`.
                trigger_time: String,
                /// Conditions that must all hold for the action to run.
                trigger_conditions: Vec<$crate::types::TriggerCondition>,
                /// Variables exposed to the action.
                variables: Vec<$crate::types::Variable>,
                /// Seconds before the action is stopped.
                timeout: i64,
                /// How many times a failed run is retried.
                retry_count: i64,
                /// Seconds between retries.
                retry_interval: i64,
                /// Continue the pipeline when the action fails.
                ignore_errors: bool,
                /// Skip the action in every run.
                disabled: bool,
                /// Start the next action without waiting for this one.
                run_next_parallel: bool,
                /// With `trigger_time` `ON_FAILURE`, run only on the first
                /// failing action.
                run_only_on_first_failure: bool,
                /// Place the action after the action with this id.
                after_action_id: i64,
                /// Variable keys to loop the action over.
                loops: Vec<String>,
                /// Who may see and run the action.
                permissions: $crate::types::Permissions,
                $($optional)*
            }
        }
    };
}
