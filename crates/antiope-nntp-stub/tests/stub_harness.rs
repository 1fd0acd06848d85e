use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use antiope_nntp::{NewsServer, NntpClient, NntpError};
use antiope_nntp_stub::{StubConfig, StubServer, load_fixtures};

fn fixtures_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..")
        .join("fixtures")
        .join("nntp")
        .join(name)
}

fn available_port() -> u16 {
    let socket = std::net::TcpListener::bind("127.0.0.1:0").expect("bind port");
    socket.local_addr().expect("local addr").port()
}

fn stub_config(port: u16) -> StubConfig {
    StubConfig {
        bind: SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), port),
        chunk_size: 0,
        disconnect_after: 0,
        delay_ms: 0,
    }
}

async fn start_stub(config: StubConfig, fixtures: &str) -> NewsServer {
    let port = config.bind.port();
    let fixtures = load_fixtures(&fixtures_path(fixtures)).expect("fixtures load");
    let server = StubServer::new(config, fixtures);
    tokio::spawn(async move {
        let _ = server.serve_once().await;
    });
    tokio::time::sleep(Duration::from_millis(20)).await;

    NewsServer {
        command_timeout: Some(Duration::from_secs(5)),
        ..NewsServer::new(format!("ws://127.0.0.1:{port}"))
    }
}

#[tokio::test]
async fn lists_groups_from_stub() {
    let server = start_stub(stub_config(available_port()), "groups-basic.json").await;
    let client = NntpClient::connect(&server).await.expect("connect");

    let groups = client.get_news_group_list().await.expect("group list");
    let names: Vec<_> = groups.iter().map(|g| g.name.as_str()).collect();
    assert_eq!(names, vec!["alt.test", "comp.lang.rust", "misc.quiet"]);
    assert_eq!(groups[0].description, "short description");
    assert_eq!(groups[0].low_water, 1);
    assert_eq!(groups[0].high_water, 100);
    assert_eq!(groups[1].high_water, 98312);

    client.close();
}

#[tokio::test]
async fn reassembles_responses_cut_into_small_messages() {
    let config = StubConfig {
        chunk_size: 7,
        ..stub_config(available_port())
    };
    let server = start_stub(config, "groups-basic.json").await;
    let client = NntpClient::connect(&server).await.expect("connect");

    let groups = client.get_news_group_list().await.expect("group list");
    assert_eq!(groups.len(), 3);
    assert_eq!(groups[2].name, "misc.quiet");
    assert_eq!(groups[2].description, "Nothing happens here");

    let help = client
        .send_command::<&str>("HELP", &[], false)
        .await
        .expect("help");
    assert_eq!(help.response_code, 100);
    assert_eq!(help.lines.last().map(String::as_str), Some("."));

    client.close();
}

#[tokio::test]
async fn mode_reader_reply_reaches_its_caller() {
    let server = start_stub(stub_config(available_port()), "groups-basic.json").await;
    let client = NntpClient::connect(&server).await.expect("connect");

    let mode = client
        .send_command("MODE", &["READER"], false)
        .await
        .expect("mode reader");
    assert_eq!(mode.response_code, 200);
    assert_eq!(mode.lines, vec!["200 reader mode, posting permitted"]);

    let groups = client.get_news_group_list().await.expect("group list");
    assert_eq!(groups.len(), 3);

    client.close();
}

#[tokio::test]
async fn active_only_group_fails_listing() {
    let server = start_stub(stub_config(available_port()), "groups-orphan.json").await;
    let client = NntpClient::connect(&server).await.expect("connect");

    let err = client.get_news_group_list().await.expect_err("should fail");
    assert!(matches!(err, NntpError::MissingGroup(name) if name == "alt.orphan"));

    client.close();
}

#[tokio::test]
async fn unknown_command_resolves_with_error_status() {
    let server = start_stub(stub_config(available_port()), "groups-basic.json").await;
    let client = NntpClient::connect(&server).await.expect("connect");

    let response = client
        .send_command("XOVER", &["1-10"], false)
        .await
        .expect("response");
    assert_eq!(response.response_code, 500);
    assert_eq!(response.lines, vec!["500 command not recognized"]);

    client.close();
}

#[tokio::test]
async fn disconnect_fails_pending_command() {
    let config = StubConfig {
        disconnect_after: 1,
        ..stub_config(available_port())
    };
    let server = start_stub(config, "groups-basic.json").await;
    let client = NntpClient::connect(&server).await.expect("connect");

    let err = client
        .send_command::<&str>("CAPABILITIES", &[], true)
        .await
        .expect_err("should fail");
    assert!(matches!(err, NntpError::ConnectionClosed(_)));
}
