use fibre_registry::{ComponentType, Container, Event, Listener, Publisher, Result};

struct OrderPlaced {
  id: u32,
}

struct Shipped {
  id: u32,
}

// Reacts to every placed order by shipping it.
struct Warehouse {
  publisher: Publisher,
}

impl Listener for Warehouse {
  fn notify(&self, event: &Event) -> Result<()> {
    if let Some(order) = event.payload::<OrderPlaced>() {
      println!("[warehouse] packing order {}", order.id);
      self
        .publisher
        .publish(&Event::new("warehouse", Shipped { id: order.id }))?;
    }
    Ok(())
  }
}

struct Mailer;

impl Listener for Mailer {
  fn notify(&self, event: &Event) -> Result<()> {
    if let Some(order) = event.payload::<OrderPlaced>() {
      println!("[mailer] thanks for order {}", order.id);
    } else if let Some(shipment) = event.payload::<Shipped>() {
      println!("[mailer] order {} is on its way", shipment.id);
    }
    Ok(())
  }
}

fn main() -> Result<()> {
  let container = Container::builder()
    .eager_as(
      "warehouse",
      ComponentType::builder::<Warehouse>().listener(),
      |c| {
        Ok(Warehouse {
          publisher: c.publisher(),
        })
      },
    )
    .eager_as("mailer", ComponentType::builder::<Mailer>().listener(), |_| {
      Ok(Mailer)
    })
    .build(None)?;

  println!("{} listeners registered", container.listener_count());

  // The shipment event is delivered to everyone before the mailer sees the order.
  container.publish(&Event::new("checkout", OrderPlaced { id: 7 }))?;
  Ok(())
}
