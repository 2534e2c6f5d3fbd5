use fibre_registry::{Container, Properties};
use std::sync::Arc;

struct Session {
  user: String,
  greeting: String,
}

// Builds a short-lived container for one request, on top of the application container.
fn request_scope(app: &Arc<Container>, user: &str) -> Arc<Container> {
  let request = Properties::new()
    .set("request.user", user.to_string())
    .build(Some(app.clone()));

  Container::builder()
    .proto("session", |c| {
      Ok(Session {
        user: (*c.named::<String>("request.user")?).clone(),
        greeting: (*c.named::<String>("app.greeting")?).clone(),
      })
    })
    .build(Some(request))
    .expect("bindings are valid")
}

fn main() {
  let app = Properties::new()
    .set("app.greeting", String::from("Welcome"))
    .set("app.name", String::from("fibre"))
    .build(None);

  for user in ["alice", "bob"] {
    let scope = request_scope(&app, user);
    let session = scope.named::<Session>("session").unwrap();
    println!("{}, {}!", session.greeting, session.user);
    assert_eq!(session.user, user);
  }

  // Names bound in a request scope never leak into the application container.
  assert!(!app.has("request.user"));
  println!("\nVerified that request values stay in their own scope.");
}
