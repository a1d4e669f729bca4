mod cli;

use std::io;
use std::sync::Arc;

use clap::Parser;
use cli::{Cli, Command};
use lazy_fs::{LazyFileSystem, MountOptions, Preload};
use lazy_fs_fuse::BlockFile;
use typed_bytesize::ByteSizeIec;
use vfs::DirEntryType;

fn main() -> io::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let options = MountOptions {
        preload: if cli.lazy { Preload::Root } else { Preload::Tree },
    };

    let block_file = match cli.command {
        Command::Format { size } => {
            BlockFile::create(&cli.image, ByteSizeIec::mib(size).0, cli.io_size)?
        }
        _ => BlockFile::open(&cli.image, cli.io_size)?,
    };
    let mut fs = LazyFileSystem::mount(Arc::new(block_file), options).map_err(io::Error::other)?;

    run(&mut fs, cli.command)?;

    fs.unmount().map_err(io::Error::other)
}

fn run(fs: &mut LazyFileSystem, command: Command) -> io::Result<()> {
    match command {
        Command::Format { .. } => {
            let layout = fs.layout();
            println!(
                "block size: {}B\ninodes: {}\ndata blocks: {}\nmax file size: {}B",
                layout.block_size, layout.max_inodes, layout.data.blocks, layout.max_file_size
            );
        }
        Command::Mkdir { path } => fs.make_directory(&path).map_err(io::Error::other)?,
        Command::Touch { path } => {
            // 已存在时只更新时间戳
            if !fs.lookup(&path).map_err(io::Error::other)?.found {
                fs.make_file(&path, DirEntryType::Regular)
                    .map_err(io::Error::other)?;
            }
            fs.touch(&path).map_err(io::Error::other)?;
        }
        Command::Symlink { target, path } => fs
            .make_symlink(&path, &target)
            .map_err(io::Error::other)?,
        Command::Ls { path } => {
            let mut index = 0;
            while let Some(entry) = fs
                .list_directory(&path, index)
                .map_err(io::Error::other)?
            {
                println!("{:>6} {} {}", entry.inode, type_char(entry.ty), entry.name);
                index += 1;
            }
        }
        Command::Stat { path } => {
            let stat = fs.get_attributes(&path).map_err(io::Error::other)?;
            println!(
                "inode: {}\nmode: {:o}\nlinks: {}\nsize: {}\nblocks: {} x {}B",
                stat.inode,
                stat.st_mode(),
                stat.nlink,
                stat.size,
                stat.blocks,
                stat.block_size
            );
            if stat.mode == DirEntryType::SymLink {
                println!("target: {}", fs.read_link(&path).map_err(io::Error::other)?);
            }
        }
        Command::Tree => {
            println!("/");
            print_tree(fs, "/", 1)?;
        }
        Command::Pack { source, dest } => {
            let created = lazy_fs_fuse::pack(fs, &source, &dest)?;
            println!("packed {created} entries from {source:?}");
        }
    }

    Ok(())
}

fn print_tree(fs: &mut LazyFileSystem, path: &str, depth: usize) -> io::Result<()> {
    let mut index = 0;
    while let Some(entry) = fs.list_directory(path, index).map_err(io::Error::other)? {
        println!("{}{}", "  ".repeat(depth), entry.name);
        if entry.ty.is_dir() {
            let child = if path == "/" {
                format!("/{}", entry.name)
            } else {
                format!("{path}/{}", entry.name)
            };
            print_tree(fs, &child, depth + 1)?;
        }
        index += 1;
    }
    Ok(())
}

fn type_char(ty: DirEntryType) -> char {
    match ty {
        DirEntryType::Directory => 'd',
        DirEntryType::SymLink => 'l',
        DirEntryType::Regular => '-',
    }
}
