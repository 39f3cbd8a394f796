//! Actions that deploy to cloud services.

pipeline_action! {
    /// Deploys code to an AWS Lambda function.
    AwsLambdaDeploy {
        args: AwsLambdaDeployArgs,
        state: AwsLambdaDeployState,
        props: AwsLambdaDeployProps,
        type_token: "conveyor:pipeline/awsLambdaDeploy:AwsLambdaDeploy",
        kind: "AWS_LAMBDA_DEPLOY",
        replace_on_change: false,
        required {
            function_name: String,
            region: String,
            /// AWS integration. A full integration object is sent as its hash id.
            integration: crate::types::IntegrationSource,
        }
        optional {
            /// Directory or zip archive with the function code.
            local_path: String,
            /// Publish a new function version.
            publish_version: bool,
            /// Alias to point at the published version.
            alias: String,
            /// Required when `alias` is set.
            alias_description: String,
        }
    }
}

pipeline_action! {
    /// Runs Terraform commands.
    TerraformApply {
        args: TerraformApplyArgs,
        state: TerraformApplyState,
        props: TerraformApplyProps,
        type_token: "conveyor:pipeline/terraformApply:TerraformApply",
        kind: "TERRAFORM",
        replace_on_change: false,
        required {
            /// Terraform version.
            version: String,
            /// `LOCAL` runs on the pipeline worker, `REMOTE` on `host`.
            server_group: String,
            /// Terraform commands, e.g. `terraform plan`.
            execute_commands: Vec<String>,
        }
        optional {
            /// Required when `server_group` is `REMOTE`.
            host: String,
            port: String,
            authentication_mode: String,
            login: String,
            password: String,
            key: String,
            working_directory: String,
            /// Cloud credentials passed to the providers.
            integration: crate::types::IntegrationSource,
        }
    }
}
