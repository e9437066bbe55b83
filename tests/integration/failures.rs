use plugin_release::config::{ConfigInputs, ReleaseConfig};
use plugin_release::core::{ReleaseError, user_friendly_error};
use plugin_release::pipeline::ReleasePipeline;
use plugin_release::test_utils::StaticHost;

use super::{Workspace, asset, registry_git, release_assets};

#[tokio::test]
async fn test_merge_conflict_is_rolled_back_and_nothing_is_pushed() {
    let ws = Workspace::new();
    let git = registry_git().fail_on(&["merge", "upstream/master"]);
    let host = StaticHost::new("v1.1", Some("notes"), release_assets());

    let err = ReleasePipeline::new(ws.config(), host.clone(), git.clone()).run().await.unwrap_err();

    assert!(matches!(
        err.downcast_ref::<ReleaseError>(),
        Some(ReleaseError::UpstreamUpdateFailed { branch }) if branch == "MYPLUGIN-1.1"
    ));
    let lines = git.command_lines();
    assert_eq!(lines.last().map(String::as_str), Some("merge --abort"));
    assert!(!lines.iter().any(|line| line.starts_with("commit") || line.starts_with("push")));
    assert!(host.pull_requests().is_empty());
}

#[tokio::test]
async fn test_missing_plugin_artifact_stops_before_branching() {
    let ws = Workspace::new();
    let git = registry_git();
    let host = StaticHost::new("v1.1", Some("notes"), vec![asset("lib-core-2.1.jar")]);

    let err = ReleasePipeline::new(ws.config(), host, git.clone()).run().await.unwrap_err();

    assert_eq!(
        err.to_string(),
        "No plugin artifact found in latest github release assets by prefix [myplugin]"
    );
    assert_eq!(git.calls().len(), 5, "only clone and configuration should have run");
}

#[tokio::test]
async fn test_unknown_plugin_id_lists_scanned_files() {
    let ws = Workspace::new();
    let config = ReleaseConfig::from_inputs(ConfigInputs {
        plugin_id: Some("jpgc-unknown".to_string()),
        ..ws.inputs()
    })
    .unwrap();
    let host = StaticHost::new("v1.1", Some("notes"), release_assets());

    let err = ReleasePipeline::new(config, host, registry_git()).run().await.unwrap_err();

    assert_eq!(err.to_string(), "Plugin ID=jpgc-unknown not found in any of [jpgc.json,various.json]");
}

#[tokio::test]
async fn test_missing_changelog_is_a_configuration_error() {
    let ws = Workspace::new();
    let host = StaticHost::new("v1.1", Some("   "), release_assets());

    let err = ReleasePipeline::new(ws.config(), host, registry_git()).run().await.unwrap_err();

    assert!(matches!(err.downcast_ref::<ReleaseError>(), Some(ReleaseError::ConfigError { .. })));
    assert!(err.to_string().starts_with("CHANGES is not set"));
}

#[tokio::test]
async fn test_clone_failure_reports_fork_without_token() {
    let ws = Workspace::new();
    let git = registry_git().fail_on(&["clone"]);
    let host = StaticHost::new("v1.1", Some("notes"), release_assets());

    let err = ReleasePipeline::new(ws.config(), host, git).run().await.unwrap_err();

    let ctx = user_friendly_error(err);
    let rendered = format!("{ctx}");
    assert!(rendered.contains("Failed to checkout repository: https://github.com/fork/jmeter-plugins.git"));
    assert!(!rendered.contains("ghp_secret"));
}

#[tokio::test]
async fn test_rejected_pull_request_after_push() {
    let ws = Workspace::new();
    let git = registry_git();
    let host = StaticHost::new("v1.1", Some("notes"), release_assets()).reject_pull_requests(422);

    let err = ReleasePipeline::new(ws.config(), host, git.clone()).run().await.unwrap_err();

    assert!(matches!(
        err.downcast_ref::<ReleaseError>(),
        Some(ReleaseError::GithubApiError { status: 422, .. })
    ));
    assert_eq!(git.command_lines().last().map(String::as_str), Some("push origin -u MYPLUGIN-1.1"));
}
