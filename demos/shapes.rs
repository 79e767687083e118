use latebound::internals::{DispatchEngine, DispatchError, Lifecycle, Receiver, Roster, Value};
use latebound::layers::{Dispatching, PrivilegedAccess};

const SHAPE_SCHEMA: &str = r#"
    -- the contracts every shape must satisfy, then the concrete variants
    Shape : virtual { area: f64, describe: s32 };
    Circle : Shape product { radius: f64 };
    Rectangle : Shape product { width: f64, height: f64 };
"#;

fn shape_describe(_: &mut Receiver, _: &[Value]) -> Result<Value, DispatchError> {
    Ok(Value::S32("some shape".into()))
}

fn circle_describe(_: &mut Receiver, _: &[Value]) -> Result<Value, DispatchError> {
    Ok(Value::S32("a circle".into()))
}

fn circle_area(recv: &mut Receiver, _: &[Value]) -> Result<Value, DispatchError> {
    let r = recv.field("radius").as_f64();
    Ok(Value::F64(3.14159 * r * r))
}

fn circle_inflate(recv: &mut Receiver, args: &[Value]) -> Result<Value, DispatchError> {
    let factor = args.first().cloned().unwrap_or(Value::F64(1.0)).as_f64();
    let r = recv.field("radius").as_f64();
    recv.set_field("radius", Value::F64(r * factor));
    Ok(Value::VOID)
}

fn rectangle_area(recv: &mut Receiver, _: &[Value]) -> Result<Value, DispatchError> {
    let w = recv.field("width").as_f64();
    let h = recv.field("height").as_f64();
    Ok(Value::F64(w * h))
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let engine = DispatchEngine::new();
    engine.load_schema(SHAPE_SCHEMA)?;

    engine.register("Shape", "describe", shape_describe)?;
    engine.register("Circle", "describe", circle_describe)?;
    engine.register("Circle", "area", circle_area)?;
    engine.register("Circle", "inflate", circle_inflate)?;
    engine.register("Rectangle", "area", rectangle_area)?;

    // the base type never gets an 'area' behavior of its own, so it
    // stays abstract
    match engine.create_instance("Shape".into(), vec![]) {
        Err(DispatchError::AbstractInstantiation(tag)) => {
            println!("'{}' is abstract and cannot be instantiated", tag);
        }
        other => anyhow::bail!("expected an abstract instantiation failure, got {:?}", other),
    }

    let mut shapes = Roster::new();
    shapes.push(engine.create_instance("Circle".into(), vec![Value::F64(5.0)])?);
    shapes.push(engine.create_instance("Rectangle".into(), vec![Value::F64(3.0), Value::F64(4.0)])?);

    // one call site; each handle's runtime tag picks the behavior
    for handle in &shapes {
        let label = engine.invoke(handle, "describe", &[])?;
        let area = engine.invoke(handle, "area", &[])?;
        println!("{} -> area {:.5}", label.as_s32(), area.as_f64());
    }

    let circle = shapes.handles[0];
    engine.invoke(&circle, "inflate", &[Value::F64(2.0)])?;

    let inspector = engine.grant_inspector();
    println!(
        "circle radius after inflate: {}",
        inspector.peek(&circle, "radius")?.as_f64()
    );

    for handle in &shapes {
        engine.destroy_instance(handle);
    }

    Ok(())
}
