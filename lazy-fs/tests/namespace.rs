mod common;

use lazy_fs::Preload;
use vfs::{DirEntryType, Error};

use common::{MIB, disk, mount, names, sized_disk};

#[test]
fn create_errors() {
    let mut fs = mount(&disk(), Preload::Tree);
    fs.make_directory("/d").unwrap();
    fs.make_file("/f", DirEntryType::Regular).unwrap();

    assert_eq!(Err(Error::AlreadyExists), fs.make_directory("/d"));
    assert_eq!(Err(Error::AlreadyExists), fs.make_file("/f", DirEntryType::Regular));
    assert_eq!(Err(Error::AlreadyExists), fs.make_symlink("/d", "/f"));
    assert_eq!(Err(Error::NotFound), fs.make_directory("/missing/d"));
    assert_eq!(Err(Error::Unsupported), fs.make_directory("/f/d"));
    assert_eq!(
        Err(Error::Unsupported),
        fs.make_file("/f/g/h", DirEntryType::Regular)
    );
    assert_eq!(Err(Error::NotFound), fs.get_attributes("/missing"));
}

#[test]
fn listing_is_reverse_insertion_order() {
    let mut fs = mount(&disk(), Preload::Tree);
    for name in ["one", "two", "three"] {
        fs.make_file(&format!("/{name}"), DirEntryType::Regular).unwrap();
    }

    assert_eq!(["three", "two", "one"], names(&mut fs, "/")[..]);
    let entry = fs.list_directory("/", 0).unwrap().unwrap();
    assert_eq!(DirEntryType::Regular, entry.ty);
    assert_eq!(3, entry.inode);
    assert_eq!(None, fs.list_directory("/", 3).unwrap());
    assert_eq!(Err(Error::Unsupported), fs.list_directory("/one", 0));
    assert_eq!(Err(Error::NotFound), fs.list_directory("/none", 0));
}

#[test]
fn parent_grows_past_one_block() {
    let disk = disk();
    let mut fs = mount(&disk, Preload::Tree);
    fs.make_directory("/d").unwrap();

    // 1024 字节的块放 7 条目录项
    for i in 0..7 {
        fs.make_file(&format!("/d/f{i}"), DirEntryType::Regular).unwrap();
    }
    assert_eq!(1, fs.get_attributes("/d").unwrap().blocks);

    fs.make_file("/d/f7", DirEntryType::Regular).unwrap();
    let stat = fs.get_attributes("/d").unwrap();
    assert_eq!(2, stat.blocks);
    assert_eq!(8 * 136, stat.size);
    fs.unmount().unwrap();

    let mut fs = mount(&disk, Preload::Root);
    let mut listed = names(&mut fs, "/d");
    listed.sort();
    let expected: Vec<_> = (0..8).map(|i| format!("f{i}")).collect();
    assert_eq!(expected, listed);
}

#[test]
fn directory_direct_slots_run_out() {
    // 需要 113 个以上的 inode
    let disk = sized_disk(4 * MIB);
    let mut fs = mount(&disk, Preload::Tree);
    fs.make_directory("/d").unwrap();

    // 16 个块 × 7 条
    for i in 0..112 {
        fs.make_file(&format!("/d/{i}"), DirEntryType::Regular).unwrap();
    }
    assert_eq!(16, fs.get_attributes("/d").unwrap().blocks);
    assert_eq!(
        Err(Error::NoSpace),
        fs.make_file("/d/112", DirEntryType::Regular)
    );
    assert!(!fs.lookup("/d/112").unwrap().found);
    fs.unmount().unwrap();

    let mut fs = mount(&disk, Preload::Tree);
    assert_eq!(112, names(&mut fs, "/d").len());
}

#[test]
fn inodes_run_out() {
    let mut fs = mount(&disk(), Preload::Tree);
    let max_inodes = fs.layout().max_inodes;

    // 0 号是根目录
    for i in 1..max_inodes {
        fs.make_file(&format!("/f{i}"), DirEntryType::Regular).unwrap();
    }
    assert_eq!(
        Err(Error::NoSpace),
        fs.make_file("/last", DirEntryType::Regular)
    );
    assert_eq!(max_inodes, fs.inode_bitmap().allocated());
}

#[test]
fn symlinks() {
    let disk = disk();
    let mut fs = mount(&disk, Preload::Tree);
    fs.make_directory("/x").unwrap();
    fs.make_symlink("/x/link", "/x/target").unwrap();

    let stat = fs.get_attributes("/x/link").unwrap();
    assert_eq!(DirEntryType::SymLink, stat.mode);
    assert_eq!(9, stat.size);
    assert_eq!(0, stat.blocks);
    assert_eq!("/x/target", fs.read_link("/x/link").unwrap());
    assert_eq!(Err(Error::Unsupported), fs.read_link("/x"));
    assert_eq!(Err(Error::NotFound), fs.read_link("/x/none"));

    // 解析不跟随符号链接
    assert!(!fs.lookup("/x/link/y").unwrap().found);
    fs.unmount().unwrap();

    let mut fs = mount(&disk, Preload::Root);
    assert_eq!("/x/target", fs.read_link("/x/link").unwrap());
}

#[test]
fn attributes() {
    let mut fs = mount(&disk(), Preload::Tree);
    fs.make_directory("/d").unwrap();
    fs.make_file("/d/a", DirEntryType::Regular).unwrap();

    let root = fs.get_attributes("/").unwrap();
    assert_eq!(0, root.inode);
    assert_eq!(2, root.nlink);
    assert_eq!(0o040777, root.st_mode());
    assert_eq!(1024, root.block_size);
    assert_eq!(1024, root.blocks);
    // 根目录：inode + 块；/d：inode + 块；/d/a：inode
    assert_eq!(5 * 1024, root.size);

    let dir = fs.get_attributes("/d").unwrap();
    assert_eq!(1, dir.inode);
    assert_eq!(1, dir.nlink);
    assert_eq!(136, dir.size);
    assert_eq!(1, dir.blocks);

    let file = fs.get_attributes("/d/a").unwrap();
    assert_eq!(0o100777, file.st_mode());
    assert_eq!(0, file.size);
    assert_eq!(0, file.blocks);
}

#[test]
fn touch_is_accepted() {
    let mut fs = mount(&disk(), Preload::Tree);
    fs.make_file("/f", DirEntryType::Regular).unwrap();
    assert_eq!(Ok(()), fs.touch("/f"));
}
