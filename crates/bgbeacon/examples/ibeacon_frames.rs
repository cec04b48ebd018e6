use bgbeacon::bgapi::packet::encode_gap_set_adv_data;
use bgbeacon::{build_primary_advertising_block, build_scan_response_block, BeaconParameters};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // AirLocate UUID, major 5, minor 2
    let uuid = hex::decode("F1B41CDEDBF54ACF8679ECB8B4DCA700")?;
    let params = BeaconParameters::builder(uuid).major(5).minor(2).build()?;

    let advertisement = build_primary_advertising_block(&params);
    let scan_response = build_scan_response_block(params.local_name())?;

    println!("Advertisement:  {}", hex::encode_upper(advertisement));
    println!("Scan response:  {}", hex::encode_upper(&scan_response));
    println!(
        "Interval ticks: {}..{}",
        params.adv_interval_min_ticks(),
        params.adv_interval_max_ticks()
    );

    // Frames exactly as they go out on the wire
    let adv_frame = encode_gap_set_adv_data(false, &advertisement)?;
    let scan_frame = encode_gap_set_adv_data(true, &scan_response)?;
    println!("Frame:          {}", hex::encode_upper(adv_frame));
    println!("Frame:          {}", hex::encode_upper(scan_frame));

    Ok(())
}
