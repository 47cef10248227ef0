use assert_cmd::prelude::*; // Add methods on commands
use predicates::prelude::*; // Used for writing assertions
use std::process::Command; // Run programs
use std::path::PathBuf;

/// pack a (track,sector) address the way it is stored on disk
fn pair(track: u8,sector: u8) -> [u8;2] {
    [sector,track]
}

fn link_block(prev: [u8;2],next: [u8;2],ptrs: &[[u8;2]]) -> Vec<u8> {
    let mut dat = vec![0;128];
    dat[0..2].copy_from_slice(&prev);
    dat[2..4].copy_from_slice(&next);
    for (i,p) in ptrs.iter().enumerate() {
        dat[4+i*2..6+i*2].copy_from_slice(p);
    }
    dat
}

fn dir_record(name: &str,ext: &str,attr: u8,eof: u8,secs: u16,link: [u8;2]) -> Vec<u8> {
    let mut dat = vec![0;16];
    for (i,b) in name.bytes().enumerate() {
        dat[1+i] = b;
    }
    for (i,b) in ext.bytes().enumerate() {
        dat[7+i] = b;
    }
    dat[10] = attr;
    dat[11] = eof;
    let count = u16::to_le_bytes(secs);
    dat[12] = count[0];
    dat[13] = count[1];
    dat[14] = link[0];
    dat[15] = link[1];
    dat
}

fn set_sector(buf: &mut [u8],track: usize,sector: usize,dat: &[u8]) {
    let offset = (track*26 + sector - 1)*128;
    buf[offset..offset+dat.len()].copy_from_slice(dat);
}

const GREETING: &[u8] = b"ISIS-II LIVES\n";

/// single density image with HELLO (200 bytes of counting pattern at (2,5))
/// and TEST.TXT (a short greeting at (3,1))
fn build_image() -> Vec<u8> {
    let mut buf = vec![0;256256];
    set_sector(&mut buf,1,1,&link_block(pair(0,0),pair(0,0),&[pair(1,2)]));
    let mut dir = Vec::new();
    dir.append(&mut dir_record("HELLO","",0,72,2,pair(2,5)));
    dir.append(&mut dir_record("TEST","TXT",0,GREETING.len() as u8,1,pair(3,1)));
    while dir.len() < 128 {
        let mut unused = vec![0;16];
        unused[0] = 0x7f;
        dir.append(&mut unused);
    }
    set_sector(&mut buf,1,2,&dir);
    set_sector(&mut buf,2,5,&link_block(pair(0,0),pair(0,0),&[pair(2,6),pair(2,7)]));
    let pattern: Vec<u8> = (0..=255).collect();
    set_sector(&mut buf,2,6,&pattern[0..128]);
    set_sector(&mut buf,2,7,&pattern[128..256]);
    set_sector(&mut buf,3,1,&link_block(pair(0,0),pair(0,0),&[pair(3,2)]));
    set_sector(&mut buf,3,2,GREETING);
    buf
}

fn write_image(dir: &tempfile::TempDir) -> PathBuf {
    let path = dir.path().join("system.bin");
    std::fs::write(&path,build_image()).expect("failed to write test image");
    path
}

#[test]
fn catalog() -> Result<(), Box<dyn std::error::Error>> {
    let tmp = tempfile::tempdir()?;
    let img_path = write_image(&tmp);
    let mut cmd = Command::cargo_bin("isiskit")?;
    cmd.arg("catalog")
        .arg("-d").arg(&img_path)
        .assert()
        .success()
        .stdout(predicate::str::is_match(r"hello\s+200 \(2,5\)").unwrap()
            .and(predicate::str::is_match(r"test\.txt\s+14 \(3,1\)").unwrap()));
    Ok(())
}

#[test]
fn unpack_all() -> Result<(), Box<dyn std::error::Error>> {
    let tmp = tempfile::tempdir()?;
    let img_path = write_image(&tmp);
    let dest = tmp.path().join("dump");
    let mut cmd = Command::cargo_bin("isiskit")?;
    cmd.arg("unpack")
        .arg("-d").arg(&img_path)
        .arg("-o").arg(&dest)
        .assert()
        .success();
    let expected: Vec<u8> = (0..200).map(|x| x as u8).collect();
    assert_eq!(std::fs::read(dest.join("hello"))?,expected);
    assert_eq!(std::fs::read(dest.join("test.txt"))?,GREETING);
    Ok(())
}

#[test]
fn unpack_glob() -> Result<(), Box<dyn std::error::Error>> {
    let tmp = tempfile::tempdir()?;
    let img_path = write_image(&tmp);
    let dest = tmp.path().join("dump");
    let mut cmd = Command::cargo_bin("isiskit")?;
    cmd.arg("unpack")
        .arg("-d").arg(&img_path)
        .arg("-o").arg(&dest)
        .arg("-g").arg("*.txt")
        .assert()
        .success();
    assert_eq!(std::fs::read(dest.join("test.txt"))?,GREETING);
    assert!(std::fs::metadata(dest.join("hello")).is_err());
    Ok(())
}

#[test]
fn get_file() -> Result<(), Box<dyn std::error::Error>> {
    let tmp = tempfile::tempdir()?;
    let img_path = write_image(&tmp);
    let mut cmd = Command::cargo_bin("isiskit")?;
    let output = cmd.arg("get")
        .arg("-f").arg("test.txt")
        .arg("-d").arg(&img_path)
        .output()?;
    assert!(output.status.success());
    assert_eq!(output.stdout,GREETING);
    Ok(())
}

#[test]
fn get_sector() -> Result<(), Box<dyn std::error::Error>> {
    let tmp = tempfile::tempdir()?;
    let img_path = write_image(&tmp);
    let mut cmd = Command::cargo_bin("isiskit")?;
    let output = cmd.arg("get")
        .arg("-f").arg("3,0,2")
        .arg("-t").arg("sec")
        .arg("-d").arg(&img_path)
        .output()?;
    assert!(output.status.success());
    assert_eq!(output.stdout[0..GREETING.len()],*GREETING);
    assert_eq!(output.stdout.len(),128);
    Ok(())
}

#[test]
fn bad_image_is_refused() -> Result<(), Box<dyn std::error::Error>> {
    let tmp = tempfile::tempdir()?;
    let img_path = tmp.path().join("short.bin");
    std::fs::write(&img_path,vec![0;1000])?;
    let mut cmd = Command::cargo_bin("isiskit")?;
    cmd.arg("catalog")
        .arg("-d").arg(&img_path)
        .assert()
        .failure();
    Ok(())
}

#[test]
fn convert_preserves_sectors() -> Result<(), Box<dyn std::error::Error>> {
    let tmp = tempfile::tempdir()?;
    let img_path = write_image(&tmp);
    let imd_path = tmp.path().join("system.imd");
    let mut cmd = Command::cargo_bin("isiskit")?;
    cmd.arg("convert")
        .arg("-d").arg(&img_path)
        .arg("-t").arg("imd")
        .arg("-o").arg(&imd_path)
        .assert()
        .success();
    // the converted image must list the same directory
    let mut cmd = Command::cargo_bin("isiskit")?;
    cmd.arg("catalog")
        .arg("-d").arg(&imd_path)
        .assert()
        .success()
        .stdout(predicate::str::is_match(r"hello\s+200 \(2,5\)").unwrap());
    Ok(())
}

#[test]
fn objdump_sys() -> Result<(), Box<dyn std::error::Error>> {
    let tmp = tempfile::tempdir()?;
    let sys_path = tmp.path().join("isis.bin");
    let flat_path = tmp.path().join("isis.flat");
    let stream = [
        vec![3,0,0x80,0],vec![1,2,3],    // 3 bytes at 0x0080
        vec![2,0,0x00,0x10],vec![9,8],   // 2 bytes at 0x1000
        vec![0,0,0x00,0x30]              // terminator, entry 0x3000
    ].concat();
    std::fs::write(&sys_path,&stream)?;
    let mut cmd = Command::cargo_bin("isiskit")?;
    cmd.arg("objdump")
        .arg("-t").arg("sys")
        .arg("-f").arg(&sys_path)
        .arg("-o").arg(&flat_path)
        .assert()
        .success()
        .stdout(predicate::str::contains("addr 0080, end 0082, length 3")
            .and(predicate::str::contains("end record, addr 3000")));
    let flat = std::fs::read(&flat_path)?;
    assert_eq!(flat.len(),0x1002);
    assert_eq!(flat[0x80..0x83],[1,2,3]);
    assert_eq!(flat[0x1000..0x1002],[9,8]);
    Ok(())
}

#[test]
fn completions() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::cargo_bin("isiskit")?;
    cmd.arg("completions")
        .arg("-s").arg("bash")
        .assert()
        .success()
        .stdout(predicate::str::contains("isiskit"));
    Ok(())
}
