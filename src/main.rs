use std::sync::Arc;
use std::thread;
use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use log::info;
use vhid::hid::MAX_INPUT_REPORT_SIZE;
use vhid::{HidReport, IoControlCode, IoRequest, IoStatus, KeyEvent, VirtualHidDevice};

/// Usage ID of the 'a' key.
const KEY_A: u8 = 0x04;
/// Reports the reader waits for: one press, one release.
const EXPECTED_REPORTS: usize = 2;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let device = Arc::new(VirtualHidDevice::new());
    info!("virtual HID device up: {:?}", device.attributes());

    let reader = {
        let device = Arc::clone(&device);
        thread::Builder::new()
            .name("hid-reader".into())
            .spawn(move || read_reports(&device, EXPECTED_REPORTS))
            .context("failed to spawn reader thread")?
    };

    // Let the reader park its first read so the press completes it.
    while !device.has_pending_read() {
        thread::yield_now();
    }

    send_key(&device, KeyEvent::press(KEY_A))?;
    thread::sleep(Duration::from_millis(50));
    send_key(&device, KeyEvent::release(KEY_A))?;

    let reports = reader
        .join()
        .map_err(|_| anyhow!("reader thread panicked"))??;

    for (i, report) in reports.iter().enumerate() {
        info!("report {}: {:02x?}", i, report.to_bytes().as_slice());
    }
    device.close();
    Ok(())
}

fn send_key(device: &VirtualHidDevice, event: KeyEvent) -> Result<()> {
    let payload = event.to_bytes();
    device
        .dispatch(IoRequest::op(IoControlCode::KeyEvent).with_input(&payload))
        .with_context(|| format!("key event {:?} rejected", event))?;
    info!("injected {:?}", event);
    Ok(())
}

/// Issue reads through the dispatcher until `count` reports arrive.
fn read_reports(device: &VirtualHidDevice, count: usize) -> Result<Vec<HidReport>> {
    let mut reports = Vec::with_capacity(count);
    while reports.len() < count {
        let mut buf = [0u8; MAX_INPUT_REPORT_SIZE];
        let n = match device
            .dispatch(IoRequest::op(IoControlCode::ReadReport).with_output(&mut buf))?
        {
            IoStatus::Complete(n) => n,
            IoStatus::Pending(handle) => {
                info!("read {:?} pending", handle.id());
                handle.wait_into(&mut buf)?
            }
        };
        let report = HidReport::from_bytes(&buf[..n])
            .ok_or_else(|| anyhow!("malformed report {:02x?}", &buf[..n]))?;
        match &report {
            HidReport::Keyboard(k) => info!(
                "keyboard: modifier={:#04x} keys={:02x?}",
                k.modifier, k.keycodes
            ),
            HidReport::Mouse(_) => bail!("unexpected mouse report"),
        }
        reports.push(report);
    }
    Ok(reports)
}
