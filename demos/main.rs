use litemodel::*;

#[litemodel(table_name = "userx_table")]
pub struct User {
    #[litemodel(primary_key, auto_increment)]
    pub id: i64,
    #[litemodel(not_null)]
    pub name: String,
    #[litemodel(unique, collate = "NOCASE")]
    pub email: String,
    #[litemodel(ignore)]
    pub session: Option<String>,
}

#[litemodel(table_name = "postsx_table")]
pub struct Postsx {
    #[litemodel(primary_key, auto_increment)]
    pub id: i64,
    pub user_id: i64,
    #[litemodel(default = "untitled")]
    pub title: String,
    pub body: Vec<u8>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    // Statement text only, nothing touches a database here.
    let users = User::schema()?;
    println!("{}", create_table(&users)?);
    println!("{}", table_exists(users.name()));
    println!("{}", rename_table(users.name(), "members"));
    println!("{}", drop_table(users.name()));

    let config = OrmConfig::from_env()
        .unwrap_or_else(|_| OrmConfig::new("sqlite://demo.db").create_if_missing(true));
    let mut orm = SqliteOrm::new(config);
    orm.connect().await?;

    orm.create_table::<User>().await?;
    orm.create_table::<Postsx>().await?;

    orm.raw("insert into userx_table (name, email) values ('Ada', 'ada@mail.com')")
        .await?;
    println!("users exists: {}", orm.table_exists::<User>().await?);

    orm.rename_table::<Postsx>("posts_archive").await?;
    orm.drop_table_named("posts_archive").await?;
    orm.drop_table::<User>().await?;

    orm.close().await;
    Ok(())
}
