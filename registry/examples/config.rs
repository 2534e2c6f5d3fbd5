use fibre_registry::{Container, Properties, Result};
use std::io::Write;

struct Database {
  url: String,
  pool_size: i64,
}

fn main() -> Result<()> {
  let mut file = tempfile::NamedTempFile::new()?;
  writeln!(
    file,
    "db:\n  host: example.com\n  port: 5432\n  pool: 8\nfeatures: [audit, billing]"
  )?;

  let config = Properties::from_yaml_file(file.path())?.build(None);
  println!("Loaded configuration: {:?}", config.get_names());

  let objects = Container::builder()
    .lazy("db", |c| {
      Ok(Database {
        url: format!(
          "postgres://{}:{}",
          c.named::<String>("db.host")?,
          c.named::<i64>("db.port")?
        ),
        pool_size: *c.named::<i64>("db.pool")?,
      })
    })
    .build(Some(config.clone()))?;

  let db = objects.named::<Database>("db")?;
  println!("Connecting to {} with {} connections", db.url, db.pool_size);

  let features = config.named::<Vec<String>>("features")?;
  println!("Enabled features: {}", features.join(", "));
  Ok(())
}
