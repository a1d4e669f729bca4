mod common;

use std::sync::Arc;
use std::thread;

use lazy_fs::{MountOptions, Preload, Session};
use vfs::{DirEntryType, Error};

use common::disk;

#[test]
fn unmounted_session() {
    let session = Session::new(MountOptions::default());

    assert!(!session.is_mounted());
    assert_eq!(Err(Error::NotMounted), session.getattr("/"));
    assert_eq!(Err(Error::NotMounted), session.mkdir("/d"));
    assert_eq!(Err(Error::NotMounted), session.readdir("/", 0));
    assert_eq!(Err(Error::NotMounted), session.flush());
    assert_eq!(19, Error::NotMounted.errno());
    // 未挂载时卸载什么也不做
    assert_eq!(Ok(()), session.destroy());
}

#[test]
fn callbacks() {
    let disk = disk();
    let session = Session::new(MountOptions {
        preload: Preload::Root,
    });

    session.init(disk.clone()).unwrap();
    assert!(session.is_mounted());
    assert_eq!(Err(Error::Unsupported), session.init(disk.clone()));

    session.mkdir("/etc").unwrap();
    session.mknod("/etc/hosts", 0o100644).unwrap();
    session.mknod("/etc/empty", 0o040755).unwrap();
    session.symlink("/etc/hosts", "/hosts").unwrap();
    session.utimens("/etc/hosts").unwrap();

    assert_eq!(DirEntryType::Regular, session.getattr("/etc/hosts").unwrap().mode);
    let empty = session.getattr("/etc/empty").unwrap();
    assert_eq!(DirEntryType::Directory, empty.mode);
    assert_eq!(0, empty.blocks);
    assert_eq!("/etc/hosts", session.readlink("/hosts").unwrap());
    assert_eq!("empty", session.readdir("/etc", 0).unwrap().unwrap().name);
    assert_eq!(Err(Error::AlreadyExists), session.mkdir("/etc"));
    assert_eq!(2, Error::NotFound.errno());

    session.destroy().unwrap();
    assert!(!session.is_mounted());

    session.init(disk).unwrap();
    assert_eq!(DirEntryType::SymLink, session.getattr("/hosts").unwrap().mode);
    session.destroy().unwrap();
}

#[test]
fn callbacks_from_many_threads() {
    let session = Arc::new(Session::new(MountOptions::default()));
    session.init(disk()).unwrap();

    let handles: Vec<_> = (0..4)
        .map(|t| {
            let session = session.clone();
            thread::spawn(move || {
                for i in 0..10 {
                    session.mkdir(&format!("/t{t}-{i}")).unwrap();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let mut count = 0;
    while session.readdir("/", count).unwrap().is_some() {
        count += 1;
    }
    assert_eq!(40, count);
    session.destroy().unwrap();
}
