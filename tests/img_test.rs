// test of the disk image layer
use isiskit::img::{DiskImage,DiskKind};
use isiskit::img::raw::Raw;
use isiskit::img::imd::Imd;

#[test]
fn layout_selection() {
    let sd = Raw::from_bytes(&vec![0;256256]).expect("single density size was refused");
    assert_eq!(sd.kind(),DiskKind::SingleDensity);
    assert_eq!(sd.kind().sectors(),26);
    let dd = Raw::from_bytes(&vec![0;512512]).expect("double density size was refused");
    assert_eq!(dd.kind(),DiskKind::DoubleDensity);
    assert_eq!(dd.kind().sectors(),52);
    assert!(Raw::from_bytes(&vec![0;256255]).is_err());
    assert!(Raw::from_bytes(&vec![0;256257]).is_err());
    assert!(Raw::from_bytes(&vec![0;143360]).is_err());
    assert!(Raw::from_bytes(&Vec::new()).is_err());
}

#[test]
fn factory_selection() {
    assert!(isiskit::create_img_from_bytestream(&vec![0;256256],None).is_ok());
    assert!(isiskit::create_img_from_bytestream(&vec![0;256256],Some("bin")).is_ok());
    assert!(isiskit::create_img_from_bytestream(&vec![0;1000],None).is_err());
    // wrong extension restricts the attempt
    assert!(isiskit::create_img_from_bytestream(&vec![0;256256],Some("imd")).is_err());
}

#[test]
fn coordinates_are_checked() {
    let mut sd = Raw::from_bytes(&vec![0;256256]).expect("image was refused");
    assert!(sd.read_sector(0,0,1).is_ok());
    assert!(sd.read_sector(76,0,26).is_ok());
    assert!(sd.read_sector(77,0,1).is_err());
    assert!(sd.read_sector(0,1,1).is_err());
    assert!(sd.read_sector(0,0,0).is_err());
    assert!(sd.read_sector(0,0,27).is_err());
    let mut dd = Raw::from_bytes(&vec![0;512512]).expect("image was refused");
    assert!(dd.read_sector(0,0,52).is_ok());
    assert!(dd.read_sector(0,0,53).is_err());
}

#[test]
fn raw_offsets() {
    let mut buf = vec![0;256256];
    // track 2, sector 5 starts at (2*26 + 4)*128
    let offset = (2*26 + 4)*128;
    for i in 0..128 {
        buf[offset+i] = i as u8;
    }
    let mut sd = Raw::from_bytes(&buf).expect("image was refused");
    let dat = sd.read_sector(2,0,5).expect("read failed");
    let expected: Vec<u8> = (0..128).map(|x| x as u8).collect();
    assert_eq!(dat,expected);
}

#[test]
fn raw_write_read() {
    let mut sd = Raw::create(DiskKind::SingleDensity);
    sd.write_sector(10,0,20,&[0xa5;128]).expect("write failed");
    assert_eq!(sd.read_sector(10,0,20).expect("read failed"),vec![0xa5;128]);
    assert_eq!(sd.to_bytes().len(),256256);
}

#[test]
fn imd_round_trip() {
    let mut imd = Imd::create(DiskKind::DoubleDensity);
    imd.write_sector(1,0,1,&[0x11;128]).expect("write failed");
    imd.write_sector(76,0,52,&[0x22;128]).expect("write failed");
    let mut partial = vec![0;128];
    for i in 0..128 {
        partial[i] = i as u8;
    }
    imd.write_sector(33,0,40,&partial).expect("write failed");
    let flat = imd.to_bytes();
    let mut back = Imd::from_bytes(&flat).expect("image was refused");
    assert_eq!(back.kind(),DiskKind::DoubleDensity);
    assert_eq!(back.track_count(),77);
    assert_eq!(back.read_sector(1,0,1).expect("read failed"),vec![0x11;128]);
    assert_eq!(back.read_sector(76,0,52).expect("read failed"),vec![0x22;128]);
    assert_eq!(back.read_sector(33,0,40).expect("read failed"),partial);
    assert_eq!(back.read_sector(0,0,1).expect("read failed"),vec![0;128]);
    assert!(back.read_sector(0,0,53).is_err());
    assert!(back.read_sector(0,1,1).is_err());
}

#[test]
fn imd_compresses_uniform_sectors() {
    let mut imd = Imd::create(DiskKind::SingleDensity);
    let flat = imd.to_bytes();
    // a blank disk is all uniform sectors, so the image should be far
    // smaller than the 256K of sector data it represents
    assert!(flat.len() < 10000);
    assert_eq!(&flat[0..9],"IMD 1.18:".as_bytes());
}

#[test]
fn imd_capacity() {
    let mut sd = Imd::create(DiskKind::SingleDensity);
    assert_eq!(sd.byte_capacity(),256256);
    assert_eq!(sd.to_bytes().len(),Imd::from_bytes(&sd.to_bytes()).expect("reparse failed").to_bytes().len());
}

#[test]
fn imd_rejects_garbage() {
    assert!(Imd::from_bytes(&vec![0;1000]).is_err());
    assert!(Imd::from_bytes("IMD 2.0: 01/01/2026 00:00:00\r\nhuh\x1a".as_bytes()).is_err());
    assert!(Imd::from_bytes("IMD".as_bytes()).is_err());
}
