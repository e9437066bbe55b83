use plugin_release::catalog::CatalogRepository;
use plugin_release::config::{ConfigInputs, ReleaseConfig};
use plugin_release::github::RepositoryRef;
use plugin_release::pipeline::ReleasePipeline;
use plugin_release::test_utils::StaticHost;

use super::{Workspace, asset, registry_git, release_assets};

#[tokio::test]
async fn test_publish_adds_version_and_opens_pull_request() {
    let ws = Workspace::new();
    let git = registry_git();
    let host = StaticHost::new("v1.1", Some("  Faster graphs\n"), release_assets());

    let outcome = ReleasePipeline::new(ws.config(), host.clone(), git.clone()).run().await.unwrap();

    assert_eq!(outcome.plugin_id, "jpgc-myplugin");
    assert_eq!(outcome.version, "1.1");
    assert_eq!(outcome.branch, "MYPLUGIN-1.1");
    assert_eq!(outcome.catalog_file, ws.catalog_file("various.json"));
    assert_eq!(
        outcome.pull_request.as_deref(),
        Some("https://github.com/undera/jmeter-plugins/pull/1")
    );

    let plugins = CatalogRepository::load(&outcome.catalog_file).await.unwrap();
    let plugin = &plugins[0];
    let (latest_version, latest) = plugin.versions.latest().unwrap();
    assert_eq!(latest_version, "1.1");
    assert_eq!(latest.changes.as_deref(), Some("Faster graphs"));
    assert_eq!(latest.download_url.as_deref(), Some(asset("myplugin-1.1.jar").download_url.as_str()));
    assert_eq!(latest.depends(), ["jpgc-common".to_string()]);

    let libs = latest.libs.as_ref().unwrap();
    assert_eq!(libs.len(), 1);
    assert_eq!(libs["lib-core>=2.1"], asset("lib-core-2.1.jar").download_url);

    // Untouched records and unknown fields survive the rewrite
    assert_eq!(plugin.versions.len(), 3);
    let rewritten = std::fs::read_to_string(&outcome.catalog_file).unwrap();
    assert!(rewritten.contains(
        r#"    "screenshotUrl": "https://example.com/shot.png",
    "versions": {
      "0.9": {
        "changes": "Preview","#
    ));
    let untouched = std::fs::read_to_string(ws.catalog_file("jpgc.json")).unwrap();
    assert!(untouched.contains("jpgc-common-0.1.jar"));

    assert_eq!(
        git.command_lines()[5..],
        [
            "checkout -b MYPLUGIN-1.1",
            "fetch upstream",
            "merge upstream/master --allow-unrelated-histories",
            "add .",
            "commit -m myplugin-repo v1.1 release",
            "push origin -u MYPLUGIN-1.1",
        ]
    );

    let pull_requests = host.pull_requests();
    assert_eq!(pull_requests.len(), 1);
    let (target, request) = &pull_requests[0];
    assert_eq!(target, &RepositoryRef::new("undera", "jmeter-plugins"));
    assert_eq!(request.head, "fork:MYPLUGIN-1.1");
    assert_eq!(request.base, "master");
    assert_eq!(request.title, "myplugin-repo v1.1 release");
    assert_eq!(request.body, "Faster graphs");
}

#[tokio::test]
async fn test_publish_without_pull_request() {
    let ws = Workspace::new();
    let host = StaticHost::new("v1.1", Some("notes"), release_assets());
    let config = ReleaseConfig::from_inputs(ConfigInputs {
        open_pull_request: Some(false),
        ..ws.inputs()
    })
    .unwrap();

    let outcome = ReleasePipeline::new(config, host.clone(), registry_git()).run().await.unwrap();

    assert_eq!(outcome.pull_request, None);
    assert!(host.pull_requests().is_empty());
}

#[tokio::test]
async fn test_configured_changes_take_precedence_over_release_notes() {
    let ws = Workspace::new();
    let host = StaticHost::new("1.1", Some("Generated notes"), release_assets());
    let config = ReleaseConfig::from_inputs(ConfigInputs {
        changes: Some("Hand written changelog".to_string()),
        ..ws.inputs()
    })
    .unwrap();

    let outcome = ReleasePipeline::new(config, host.clone(), registry_git()).run().await.unwrap();

    let plugins = CatalogRepository::load(&outcome.catalog_file).await.unwrap();
    let (_, latest) = plugins[0].versions.latest().unwrap();
    assert_eq!(latest.changes.as_deref(), Some("Hand written changelog"));
    assert_eq!(host.pull_requests()[0].1.body, "Hand written changelog");
}

#[tokio::test]
async fn test_republishing_existing_version_keeps_catalog_entry() {
    let ws = Workspace::new();
    let host = StaticHost::new("v1.0", Some("Rebuilt"), vec![asset("myplugin-1.0.jar")]);

    let outcome = ReleasePipeline::new(ws.config(), host, registry_git()).run().await.unwrap();

    let plugins = CatalogRepository::load(&outcome.catalog_file).await.unwrap();
    let entry = plugins[0].versions.get("1.0").unwrap();
    assert_eq!(plugins[0].versions.len(), 2);
    assert_eq!(entry.changes.as_deref(), Some("First stable"));
}
