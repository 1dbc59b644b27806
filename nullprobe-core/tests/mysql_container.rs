//! Probe runs against a real MySQL server in a container.
//!
//! Enabled with `--features docker-tests`; requires a Docker daemon.

#![cfg(feature = "docker-tests")]

use nullprobe_core::{
    Check, DsnSource, MySqlSource, Probe, ProbeConfig, QuerySource, Result,
};
use std::time::Duration;
use testcontainers_modules::{mysql::Mysql, testcontainers::runners::AsyncRunner};

/// Helper function to wait for MySQL to be ready
async fn connect_when_ready(dsn: &str, max_attempts: u32) -> Result<MySqlSource> {
    let mut attempts = 0;
    loop {
        match MySqlSource::connect(dsn).await {
            Ok(source) => return Ok(source),
            Err(e) => {
                attempts += 1;
                if attempts >= max_attempts {
                    return Err(e);
                }
                tokio::time::sleep(Duration::from_millis(500)).await;
            }
        }
    }
}

#[tokio::test]
async fn test_container_default_plan() -> Result<()> {
    let mysql = Mysql::default().start().await.unwrap();
    let port = mysql.get_host_port_ipv4(3306).await.unwrap();
    let dsn = format!("root@tcp(127.0.0.1:{port})/test");

    let source = connect_when_ready(&dsn, 60).await?;
    let config = ProbeConfig::new(dsn, DsnSource::Environment);

    let mut out = Vec::new();
    let summary = Probe::new(source, config).run(&mut out).await?;
    let text = String::from_utf8(out).unwrap();

    // plain MySQL: no maxscale variables, not a replica
    assert!(text.contains("show slave status: no rows (not a replica)"));
    assert!(text.contains("OK: VERSION() ('"));
    assert!(text.contains("OK: @@hostname ('"));
    // report_host is unset, so the scalar scan hits NULL
    assert!(text.contains("WARNING: @@report_host gave an error: '"));
    assert_eq!(summary.warnings, 0);

    Ok(())
}

#[tokio::test]
async fn test_container_detects_embedded_null() -> Result<()> {
    let mysql = Mysql::default().start().await.unwrap();
    let port = mysql.get_host_port_ipv4(3306).await.unwrap();
    let dsn = format!("mysql://root@127.0.0.1:{port}/test");

    let source = connect_when_ready(&dsn, 60).await?;
    let config = ProbeConfig::new(dsn, DsnSource::Environment);
    let checks = vec![
        Check::scalar("corrupted", "SELECT CONCAT('max', CHAR(0 USING utf8mb4), 'scale')"),
        Check::scalar("empty", "SELECT 'x' FROM DUAL WHERE 1 = 0"),
    ];

    let mut out = Vec::new();
    let summary = Probe::new(source, config)
        .with_checks(checks)
        .run(&mut out)
        .await?;
    let text = String::from_utf8(out).unwrap();

    assert_eq!(summary.warnings, 1);
    assert_eq!(summary.failed, 1);
    assert!(text.contains("has 1 nulls (6d 61 78 00 73 63 61 6c 65)"));
    assert!(text.contains("WARNING: empty gave an error: 'sql: no rows in result set'"));

    Ok(())
}

#[tokio::test]
async fn test_container_source_ping_and_close() -> Result<()> {
    let mysql = Mysql::default().start().await.unwrap();
    let port = mysql.get_host_port_ipv4(3306).await.unwrap();

    let mut source = connect_when_ready(&format!("root@tcp(127.0.0.1:{port})/"), 60).await?;
    source.ping().await.unwrap();
    source.close().await.unwrap();

    Ok(())
}
