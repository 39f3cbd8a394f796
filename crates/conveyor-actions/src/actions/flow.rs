//! Actions that control pipeline flow.

pipeline_action! {
    /// Triggers another pipeline.
    ///
    /// Any change replaces the action.
    RunNextPipeline {
        args: RunNextPipelineArgs,
        state: RunNextPipelineState,
        props: RunNextPipelineProps,
        type_token: "conveyor:pipeline/runNextPipeline:RunNextPipeline",
        kind: "RUN_NEXT_PIPELINE",
        replace_on_change: true,
        required {
            /// Project of the pipeline to trigger.
            next_project_name: String,
            /// Pipeline to trigger.
            next_pipeline_id: i64,
        }
        optional {
            /// Wait for the triggered run to finish.
            wait: bool,
            /// Revision passed to the triggered run: `HEAD` or `INHERIT`.
            revision: String,
            /// Pass this pipeline's variables to the triggered run.
            pass_variables: bool,
        }
    }
}

pipeline_action! {
    /// Stops the run until someone approves it.
    WaitForApproval {
        args: WaitForApprovalArgs,
        state: WaitForApprovalState,
        props: WaitForApprovalProps,
        type_token: "conveyor:pipeline/waitForApproval:WaitForApproval",
        kind: "WAIT_FOR_APPLY",
        replace_on_change: false,
        required {
            /// Message shown to approvers.
            comment: String,
        }
        optional {
            /// `ALL`, `ANY` or `GROUP`.
            permission: String,
            /// Required when `permission` is `GROUP`.
            group_id: i64,
            /// Seconds before the approval expires.
            approval_timeout: i64,
        }
    }
}
