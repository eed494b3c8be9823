use rustyperipheral::gap::{AdvertiseData, AdvertiseSettings, BdAddr};
use rustyperipheral::gatt::GattStatus;
use rustyperipheral::radio::{ADAPTER_STATE_ON, GATT_SUCCESS, STATE_CONNECTED, STATE_DISCONNECTED};
use rustyperipheral::{
    AdapterState, CharacteristicDeclaration, ConnectionState, Peripheral, PeripheralConfig,
    PeripheralEvent, PeripheralResult, Radio, Service, ServiceDeclaration, Uuid,
};
use std::sync::mpsc;
use std::sync::{Arc, Mutex, Weak};
use std::thread;

/// Radio that prints every call and confirms advertising from its own thread
struct ScriptedRadio {
    peripheral: Mutex<Weak<Peripheral>>,
    /// Name last handed to `set_name`
    name: Mutex<String>,
}

impl Radio for ScriptedRadio {
    fn adapter_state(&self) -> Option<AdapterState> {
        // A binding maps the platform's raw state code
        AdapterState::from_code(ADAPTER_STATE_ON)
    }

    fn set_name(&self, name: &str) -> PeripheralResult<()> {
        println!("radio: adapter name set to {:?}", name);
        *self.name.lock().unwrap() = name.to_string();
        Ok(())
    }

    fn open_gatt_server(&self, services: &[Service]) -> PeripheralResult<()> {
        for service in services {
            println!(
                "radio: publishing service {} with {} characteristic(s)",
                service.uuid,
                service.characteristics.len()
            );
        }
        Ok(())
    }

    fn close_gatt_server(&self) {
        println!("radio: GATT server closed");
    }

    fn start_advertising(
        &self,
        settings: &AdvertiseSettings,
        data: &AdvertiseData,
    ) -> PeripheralResult<()> {
        let name = self.name.lock().unwrap().clone();
        println!(
            "radio: advertising every {} x 0.625 ms at {} dBm, payload {:02X?}",
            settings.mode.interval(),
            settings.tx_power.dbm(),
            data.encode(&name)?
        );

        let peripheral = self.peripheral.lock().unwrap().clone();
        let settings = *settings;
        thread::spawn(move || {
            if let Some(peripheral) = peripheral.upgrade() {
                peripheral.on_advertise_start_success(settings);
            }
        });
        Ok(())
    }

    fn stop_advertising(&self) -> PeripheralResult<()> {
        println!("radio: advertising stopped");
        Ok(())
    }

    fn send_response(
        &self,
        device: &BdAddr,
        request_id: i32,
        status: GattStatus,
        offset: u16,
        value: &[u8],
    ) -> PeripheralResult<()> {
        println!(
            "radio: response to {} for request {}: {} offset {} value {:02X?}",
            device, request_id, status, offset, value
        );
        Ok(())
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let radio = Arc::new(ScriptedRadio {
        peripheral: Mutex::new(Weak::new()),
        name: Mutex::new(String::new()),
    });
    let peripheral = Arc::new(Peripheral::new(radio.clone(), PeripheralConfig::default()));
    *radio.peripheral.lock().unwrap() = Arc::downgrade(&peripheral);

    println!("Adapter state: {}", peripheral.get_state());

    // Hand events to an application thread that answers them
    let (tx, rx) = mpsc::channel::<PeripheralEvent>();
    let tx = Mutex::new(tx);
    peripheral.set_event_callback(move |event| {
        let _ = tx.lock().unwrap().send(event);
    });

    let app = {
        let peripheral = peripheral.clone();
        thread::spawn(move || {
            for event in rx {
                println!("app: {} {:?}", event.name(), event);
                if let Some(token) = event.request_id() {
                    if let Err(e) = peripheral.respond(token.as_str(), "success", None) {
                        eprintln!("app: failed to respond: {}", e);
                    }
                }
            }
        })
    };

    peripheral.add_service(
        &ServiceDeclaration::new("180D")
            .characteristic(CharacteristicDeclaration::new("2A37"))
            .characteristic(CharacteristicDeclaration::new("2A39")),
    )?;

    let started = peripheral.start_advertising("HRM")?;
    println!("{} as {:?}", started, started.name);

    // Simulate a central connecting and writing to the heart rate measurement
    let central = BdAddr::new([0x55, 0x44, 0x33, 0x22, 0x11, 0x00]);
    let hrs = Uuid::from_u16(0x180D);
    let hrm = Uuid::from_u16(0x2A37);
    let connected = ConnectionState::from_code(STATE_CONNECTED).ok_or("unknown state code")?;
    peripheral.on_connection_state_change(central, GATT_SUCCESS, connected);
    peripheral.on_characteristic_write_request(central, 1, hrs, hrm, false, true, 0, &[0x01, 0x02]);
    peripheral.on_characteristic_read_request(central, 2, 0, hrs, hrm);

    // Let the application thread drain its queue
    while peripheral.pending_count() > 0 {
        thread::yield_now();
    }
    println!(
        "Stored value: {:02X?}",
        peripheral.characteristic_value(&hrs, &hrm).unwrap_or_default()
    );

    let disconnected =
        ConnectionState::from_code(STATE_DISCONNECTED).ok_or("unknown state code")?;
    peripheral.on_connection_state_change(central, GATT_SUCCESS, disconnected);
    peripheral.stop_advertising()?;

    // Dropping the callback closes the event channel
    peripheral.set_event_callback(|_| {});
    app.join().map_err(|_| "application thread panicked")?;

    Ok(())
}
