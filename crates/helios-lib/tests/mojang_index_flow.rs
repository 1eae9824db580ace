use helios_lib::error::CoreError;
use helios_lib::game::mojang::VersionIndexProcessor;
use helios_lib::utils::{calculate_hash, Arch, HashAlgo, OsType};
use helios_lib::{CoreConfig, HttpClient};
use serde_json::json;
use std::path::Path;
use std::time::Duration;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const ASSETS: [(&str, &str); 3] = [
    ("minecraft/lang/en_us.json", "{\"menu.quit\":\"Quit Game\"}"),
    ("minecraft/sounds/ambient/cave/cave1.ogg", "cave sound bytes"),
    ("icons/icon_16x16.png", "png bytes"),
];

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn sha1(content: &str) -> String {
    calculate_hash(content.as_bytes(), HashAlgo::Sha1)
}

struct Fixture {
    index_body: String,
    descriptor_body: String,
    descriptor_hash: String,
}

impl Fixture {
    fn new(uri: &str, version: &str) -> Self {
        let objects: serde_json::Map<String, serde_json::Value> = ASSETS
            .iter()
            .map(|(name, content)| {
                (
                    name.to_string(),
                    json!({ "hash": sha1(content), "size": content.len() }),
                )
            })
            .collect();
        let index_body = json!({ "objects": objects }).to_string();

        let descriptor_body = json!({
            "id": version,
            "type": "release",
            "mainClass": "net.minecraft.client.main.Main",
            "assetIndex": {
                "id": "1.15",
                "sha1": sha1(&index_body),
                "size": index_body.len(),
                "totalSize": 1000,
                "url": format!("{}/indexes/1.15.json", uri)
            },
            "downloads": {
                "client": {
                    "sha1": sha1("client jar"),
                    "size": 10,
                    "url": format!("{}/client.jar", uri)
                }
            },
            "libraries": [
                {
                    "name": "com.mojang:patchy:1.1",
                    "downloads": { "artifact": {
                        "path": "com/mojang/patchy/1.1/patchy-1.1.jar",
                        "sha1": sha1("patchy"),
                        "size": 6,
                        "url": format!("{}/libraries/com/mojang/patchy/1.1/patchy-1.1.jar", uri)
                    } }
                },
                {
                    "name": "com.example:windows-only:1.0",
                    "rules": [{ "action": "allow", "os": { "name": "windows" } }],
                    "downloads": { "artifact": {
                        "path": "com/example/windows-only/1.0/windows-only-1.0.jar",
                        "sha1": sha1("windows"),
                        "size": 7,
                        "url": format!("{}/libraries/com/example/windows-only/1.0/windows-only-1.0.jar", uri)
                    } }
                }
            ],
            "logging": {
                "client": {
                    "argument": "-Dlog4j.configurationFile=${path}",
                    "file": {
                        "id": "client-1.12.xml",
                        "sha1": sha1("<Configuration/>"),
                        "size": 16,
                        "url": format!("{}/client-1.12.xml", uri)
                    },
                    "type": "log4j2-xml"
                }
            }
        })
        .to_string();

        let descriptor_hash = sha1(&descriptor_body);
        Self {
            index_body,
            descriptor_body,
            descriptor_hash,
        }
    }

    fn descriptor_path(&self, version: &str) -> String {
        format!("/v1/packages/{}/{}.json", self.descriptor_hash, version)
    }

    fn manifest(&self, uri: &str, version: &str) -> String {
        json!({
            "latest": { "release": version, "snapshot": version },
            "versions": [{
                "id": version,
                "type": "release",
                "url": format!("{}{}", uri, self.descriptor_path(version))
            }]
        })
        .to_string()
    }
}

fn config(dir: &TempDir, uri: &str) -> CoreConfig {
    let mut config = CoreConfig::new(dir.path(), format!("{}/distribution.json", uri));
    config.version_manifest_url = format!("{}/mc/game/version_manifest_v2.json", uri);
    config.resources_url = format!("{}/resources", uri);
    config.libraries_url = format!("{}/libraries", uri);
    config
}

fn processor(config: CoreConfig, version: &str, os: OsType) -> VersionIndexProcessor {
    VersionIndexProcessor::new(
        config,
        HttpClient::new(Duration::from_secs(5)).unwrap(),
        version,
    )
    .with_platform(os, Arch::X64)
}

async fn mount_all(server: &MockServer, fixture: &Fixture, version: &str) {
    Mock::given(method("GET"))
        .and(path("/mc/game/version_manifest_v2.json"))
        .respond_with(ResponseTemplate::new(200).set_body_string(fixture.manifest(&server.uri(), version)))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path(fixture.descriptor_path(version)))
        .respond_with(ResponseTemplate::new(200).set_body_string(fixture.descriptor_body.clone()))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/indexes/1.15.json"))
        .respond_with(ResponseTemplate::new(200).set_body_string(fixture.index_body.clone()))
        .mount(server)
        .await;
}

fn write(path: &Path, content: &str) {
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, content).unwrap();
}

#[tokio::test]
async fn fresh_install_reports_everything_missing() {
    init_logger();
    let server = MockServer::start().await;
    let fixture = Fixture::new(&server.uri(), "1.15.2");
    mount_all(&server, &fixture, "1.15.2").await;

    let dir = TempDir::new().unwrap();
    let config = config(&dir, &server.uri());
    let mut processor = processor(config.clone(), "1.15.2", OsType::Linux);
    processor.init().await.unwrap();

    // Descriptor and index were cached verbatim
    let descriptor = config.versions_dir().join("1.15.2").join("1.15.2.json");
    assert_eq!(std::fs::read_to_string(&descriptor).unwrap(), fixture.descriptor_body);
    let index = config.assets_dir().join("indexes").join("1.15.json");
    assert_eq!(std::fs::read_to_string(&index).unwrap(), fixture.index_body);

    assert_eq!(processor.version_json().unwrap().id, "1.15.2");
    assert_eq!(processor.asset_index().unwrap().objects.len(), 3);

    let result = processor.validate().await.unwrap();
    assert_eq!(result.assets.len(), 3);
    assert_eq!(result.libraries.len(), 1);
    assert_eq!(result.client.len(), 1);
    assert_eq!(result.misc.len(), 1);
    assert_eq!(result.total(), 6);

    // Assets come out sorted by name
    let names: Vec<&str> = result.assets.iter().map(|a| a.id.as_str()).collect();
    assert_eq!(
        names,
        vec![
            "icons/icon_16x16.png",
            "minecraft/lang/en_us.json",
            "minecraft/sounds/ambient/cave/cave1.ogg"
        ]
    );

    let icon_hash = sha1("png bytes");
    let icon = &result.assets[0];
    assert_eq!(
        icon.url,
        format!("{}/resources/{}/{}", server.uri(), &icon_hash[..2], icon_hash)
    );
    assert_eq!(
        icon.path,
        config.assets_dir().join("objects").join(&icon_hash[..2]).join(&icon_hash)
    );

    assert_eq!(
        result.client[0].path,
        config.versions_dir().join("1.15.2").join("1.15.2.jar")
    );
    assert_eq!(
        result.misc[0].path,
        config.assets_dir().join("log_configs").join("client-1.12.xml")
    );

    // Same filesystem state, same answer
    assert_eq!(processor.validate().await.unwrap(), result);

    // Fixing files shrinks the result
    write(&icon.path, "png bytes");
    write(&result.client[0].path, "client jar");
    let result = processor.validate().await.unwrap();
    assert_eq!(result.assets.len(), 2);
    assert!(result.client.is_empty());

    // A wrong hash is as good as missing
    write(&result.misc[0].path, "<Configuration broken/>");
    assert_eq!(processor.validate().await.unwrap().misc.len(), 1);
}

#[tokio::test]
async fn second_init_uses_cache_without_fetching_descriptor() {
    init_logger();
    let server = MockServer::start().await;
    let fixture = Fixture::new(&server.uri(), "1.15.2");
    mount_all(&server, &fixture, "1.15.2").await;

    let dir = TempDir::new().unwrap();
    let config = config(&dir, &server.uri());
    processor(config.clone(), "1.15.2", OsType::Linux)
        .init()
        .await
        .unwrap();

    server.reset().await;
    Mock::given(method("GET"))
        .and(path("/mc/game/version_manifest_v2.json"))
        .respond_with(ResponseTemplate::new(200).set_body_string(fixture.manifest(&server.uri(), "1.15.2")))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(fixture.descriptor_path("1.15.2")))
        .respond_with(ResponseTemplate::new(200).set_body_string(fixture.descriptor_body.clone()))
        .expect(0)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/indexes/1.15.json"))
        .respond_with(ResponseTemplate::new(200).set_body_string(fixture.index_body.clone()))
        .expect(0)
        .mount(&server)
        .await;

    let mut processor = processor(config, "1.15.2", OsType::Linux);
    processor.init().await.unwrap();
    assert!(processor.is_initialized());
}

#[tokio::test]
async fn unreachable_manifest_uses_local_descriptor() {
    init_logger();
    let server = MockServer::start().await;
    let fixture = Fixture::new(&server.uri(), "1.12.2");
    Mock::given(method("GET"))
        .and(path("/mc/game/version_manifest_v2.json"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/indexes/1.15.json"))
        .respond_with(ResponseTemplate::new(200).set_body_string(fixture.index_body.clone()))
        .expect(0)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let config = config(&dir, &server.uri());
    write(
        &config.versions_dir().join("1.12.2").join("1.12.2.json"),
        &fixture.descriptor_body,
    );
    write(
        &config.assets_dir().join("indexes").join("1.15.json"),
        &fixture.index_body,
    );

    let mut processor = processor(config, "1.12.2", OsType::Linux);
    processor.init().await.unwrap();
    assert_eq!(processor.version_json().unwrap().id, "1.12.2");
    assert_eq!(processor.validate().await.unwrap().total(), 6);
}

#[tokio::test]
async fn unreachable_manifest_without_local_descriptor_fails() {
    init_logger();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let mut processor = processor(config(&dir, &server.uri()), "1.12.2", OsType::Linux);
    assert!(matches!(
        processor.init().await,
        Err(CoreError::ContentUnavailable(_))
    ));
    assert!(!processor.is_initialized());
}

#[tokio::test]
async fn unexpected_descriptor_url_shape_is_reported() {
    init_logger();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/mc/game/version_manifest_v2.json"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            json!({ "versions": [{
                "id": "1.15.2",
                "url": format!("{}/mc/game/1.15.2.json", server.uri())
            }] })
            .to_string(),
        ))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let mut processor = processor(config(&dir, &server.uri()), "1.15.2", OsType::Linux);
    assert!(matches!(
        processor.init().await,
        Err(CoreError::FormatChanged { .. })
    ));
}

#[tokio::test]
async fn version_missing_from_manifest() {
    init_logger();
    let server = MockServer::start().await;
    let fixture = Fixture::new(&server.uri(), "1.15.2");
    mount_all(&server, &fixture, "1.15.2").await;

    let dir = TempDir::new().unwrap();
    let mut processor = processor(config(&dir, &server.uri()), "1.7.10", OsType::Linux);
    assert!(matches!(
        processor.init().await,
        Err(CoreError::ContentUnavailable(_))
    ));
}

#[tokio::test]
async fn descriptor_hash_mismatch_is_unavailable() {
    init_logger();
    let server = MockServer::start().await;
    let fixture = Fixture::new(&server.uri(), "1.15.2");
    Mock::given(method("GET"))
        .and(path("/mc/game/version_manifest_v2.json"))
        .respond_with(ResponseTemplate::new(200).set_body_string(fixture.manifest(&server.uri(), "1.15.2")))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(fixture.descriptor_path("1.15.2")))
        .respond_with(ResponseTemplate::new(200).set_body_string("{\"id\":\"tampered\"}"))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let config = config(&dir, &server.uri());
    let mut processor = processor(config.clone(), "1.15.2", OsType::Linux);
    assert!(matches!(
        processor.init().await,
        Err(CoreError::ContentUnavailable(_))
    ));
    assert!(!config.versions_dir().join("1.15.2").join("1.15.2.json").exists());
}

#[tokio::test]
async fn platform_rules_select_libraries() {
    init_logger();
    let server = MockServer::start().await;
    let fixture = Fixture::new(&server.uri(), "1.15.2");
    mount_all(&server, &fixture, "1.15.2").await;

    let dir = TempDir::new().unwrap();
    let config = config(&dir, &server.uri());

    let mut linux = processor(config.clone(), "1.15.2", OsType::Linux);
    linux.init().await.unwrap();
    let libraries = linux.validate().await.unwrap().libraries;
    assert!(libraries.iter().all(|l| l.id != "com.example:windows-only:1.0"));

    let mut windows = processor(config, "1.15.2", OsType::Windows);
    windows.init().await.unwrap();
    let ids: Vec<String> = windows
        .validate()
        .await
        .unwrap()
        .libraries
        .into_iter()
        .map(|l| l.id)
        .collect();
    assert_eq!(ids, vec!["com.mojang:patchy:1.1", "com.example:windows-only:1.0"]);
}
