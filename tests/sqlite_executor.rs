use litemodel::*;
use tempfile::TempDir;

#[litemodel(table_name = "players")]
pub struct Player {
    #[litemodel(primary_key, auto_increment)]
    pub id: i64,
    #[litemodel(not_null, unique, collate = "NOCASE")]
    pub email: String,
    #[litemodel(default = 0)]
    pub score: f64,
    pub joined: std::time::SystemTime,
    pub avatar: Vec<u8>,
}

// Helper that creates a fresh database file in a temporary directory
async fn create_temp_db() -> Result<(SqliteOrm, TempDir)> {
    let dir = tempfile::tempdir()?;
    let orm = SqliteOrm::create_and_open(dir.path().join("game.db")).await?;
    Ok((orm, dir))
}

#[tokio::test]
async fn create_is_skipped_when_table_exists() -> Result<()> {
    let (orm, _dir) = create_temp_db().await?;

    assert!(!orm.table_exists::<Player>().await?);
    assert!(orm.create_table::<Player>().await?);
    assert!(orm.table_exists::<Player>().await?);
    assert!(!orm.create_table::<Player>().await?);
    Ok(())
}

#[tokio::test]
async fn rendered_columns_accept_rows() -> Result<()> {
    let (orm, _dir) = create_temp_db().await?;
    orm.create_table::<Player>().await?;

    orm.raw("insert into players (email, joined, avatar) values ('ada@mail.com', 0, x'00')")
        .await?;
    let score: f64 = sqlx::query_scalar("select score from players where email = 'ADA@MAIL.COM'")
        .fetch_one(orm.pool()?)
        .await?;
    assert_eq!(score, 0.0);

    let err = orm
        .raw("insert into players (email, joined, avatar) values ('Ada@Mail.com', 0, x'00')")
        .await
        .unwrap_err();
    assert_eq!(err.result_code(), Some(ResultCode::Constraint));
    Ok(())
}

#[tokio::test]
async fn rename_requires_free_target() -> Result<()> {
    let (orm, _dir) = create_temp_db().await?;
    orm.create_table::<Player>().await?;

    assert!(orm.rename_table::<Player>("champions").await?);
    assert!(!orm.table_exists::<Player>().await?);
    assert!(orm.table_exists_named("champions").await?);

    // old name is gone now
    assert!(!orm.rename_table::<Player>("champions").await?);

    orm.create_table::<Player>().await?;
    assert!(!orm.rename_table_named("champions", "players").await?);

    orm.drop_table::<Player>().await?;
    assert!(orm.rename_table_named("champions", "players").await?);
    assert!(orm.table_exists::<Player>().await?);
    Ok(())
}

#[tokio::test]
async fn drop_is_skipped_when_table_missing() -> Result<()> {
    let (orm, _dir) = create_temp_db().await?;

    assert!(!orm.drop_table::<Player>().await?);
    orm.create_table::<Player>().await?;
    assert!(orm.drop_table::<Player>().await?);
    assert!(!orm.table_exists::<Player>().await?);
    Ok(())
}

#[tokio::test]
async fn reopening_keeps_tables() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("keep.db");

    let mut orm = SqliteOrm::create_and_open(&path).await?;
    orm.create_table::<Player>().await?;
    orm.close().await;
    assert!(!orm.is_connected());

    let orm = SqliteOrm::open(&path).await?;
    assert!(orm.table_exists::<Player>().await?);
    Ok(())
}

#[tokio::test]
async fn create_and_open_truncates_existing_file() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("fresh.db");

    let mut orm = SqliteOrm::create_and_open(&path).await?;
    orm.create_table::<Player>().await?;
    orm.close().await;

    let orm = SqliteOrm::create_and_open(&path).await?;
    assert!(!orm.table_exists::<Player>().await?);
    Ok(())
}

#[tokio::test]
async fn open_missing_file_fails() {
    let dir = tempfile::tempdir().unwrap();
    let result = SqliteOrm::open(dir.path().join("absent.db")).await;
    assert!(matches!(result, Err(Error::Database { .. })));
}

#[tokio::test]
async fn operations_need_a_connection() {
    let orm = SqliteOrm::new(OrmConfig::default());
    assert!(matches!(
        orm.table_exists_named("players").await,
        Err(Error::NotConnected)
    ));
    assert!(matches!(orm.raw("select 1").await, Err(Error::NotConnected)));
}

#[tokio::test]
async fn verbatim_existence_query_is_rejected_by_sqlite() -> Result<()> {
    let mut orm = SqliteOrm::new(OrmConfig::default().quoting(Quoting::Verbatim));
    orm.connect().await?;

    let err = orm.table_exists_named("players").await.unwrap_err();
    assert_eq!(err.result_code(), Some(ResultCode::Error));
    Ok(())
}

#[tokio::test]
async fn in_memory_database_from_config() -> Result<()> {
    let config = OrmConfig::from_json_str(r#"{ "database_url": "sqlite::memory:", "max_connections": 1 }"#)?;
    let mut orm = SqliteOrm::new(config);
    orm.connect().await?;

    assert!(orm.create_table::<Player>().await?);
    assert!(orm.table_exists_named("players").await?);
    Ok(())
}

#[tokio::test]
async fn repeated_table_ops_see_each_other() -> Result<()> {
    let (orm, _dir) = create_temp_db().await?;
    assert_eq!(orm.config().max_connections, 5);

    for round in 0..10 {
        let name = format!("archive_{round}");
        assert!(orm.create_table::<Player>().await?);
        assert!(orm.rename_table::<Player>(&name).await?);
        assert!(!orm.table_exists::<Player>().await?);
        assert!(orm.table_exists_named(&name).await?);
        assert!(orm.drop_table_named(&name).await?);
        assert!(!orm.table_exists_named(&name).await?);
    }
    Ok(())
}

#[tokio::test]
async fn session_reads_its_own_writes() -> Result<()> {
    let (orm, _dir) = create_temp_db().await?;
    let session = orm.session().await?;
    let ops = TableOps::new(&session, orm.renderer());

    let schema = Player::schema()?;
    assert!(ops.create(&schema).await?);
    assert!(ops.exists("players").await?);
    assert!(ops.rename("players", "old_players").await?);
    assert!(!ops.exists("players").await?);
    drop(session);

    assert!(orm.table_exists_named("old_players").await?);
    Ok(())
}

#[tokio::test]
async fn file_names_are_not_parsed_as_urls() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("we?ird#name.db");

    let orm = SqliteOrm::create_and_open(&path).await?;
    assert!(orm.create_table::<Player>().await?);
    assert!(path.exists());
    assert!(!dir.path().join("we").exists());
    Ok(())
}

#[tokio::test]
async fn bad_url_options_are_config_errors() {
    let mut orm = SqliteOrm::new(OrmConfig::new("sqlite://game.db?bogus=1"));
    assert!(matches!(orm.connect().await, Err(Error::Config(_))));
    assert!(!orm.is_connected());
}
