use event_manager::{AnyEvent, Event, EventClass, EventManager};

#[derive(Debug)]
struct OrderEvent;

impl Event for OrderEvent {
    fn event_type() -> &'static str {
        "OrderEvent"
    }
}

#[derive(Debug, Clone)]
struct OrderPlaced {
    order_id: u64,
}

impl Event for OrderPlaced {
    fn event_type() -> &'static str {
        "OrderPlaced"
    }

    fn supertypes() -> Vec<EventClass> {
        vec![EventClass::of::<OrderEvent>()]
    }
}

#[derive(Debug, Clone)]
struct PaymentReceived {
    amount_cents: u64,
}

impl Event for PaymentReceived {
    fn event_type() -> &'static str {
        "PaymentReceived"
    }
}

fn main() -> event_manager::Result<()> {
    println!("Testing event-manager...\n");

    let manager = EventManager::new();

    manager.register_typed("fulfilment", |event: &OrderPlaced| {
        println!("📦 Fulfilling order {}", event.order_id);
    })?;

    manager.register_fn("orders", vec![EventClass::of::<OrderEvent>()], |event| {
        println!("🧾 Order stream saw {}", event.event_type());
    })?;

    manager.register_fn("audit", Vec::new(), |event: &dyn AnyEvent| {
        println!("🔍 Audit: {:?}", event);
    })?;

    manager.register_typed("billing", |event: &PaymentReceived| {
        println!("💰 Received {} cents", event.amount_cents);
    })?;

    println!("Publishing events...");
    manager.publish(&OrderPlaced { order_id: 17 });
    manager.publish(&PaymentReceived { amount_cents: 4_200 });

    manager.unregister("audit");
    manager.publish_optional(None);
    manager.publish(&PaymentReceived { amount_cents: 99 });

    println!("\n{}", manager.stats());
    println!("\n✅ Demo completed successfully!");
    Ok(())
}
