use crate::cmd::VersionArgs;
use crate::exit::{CliResult, SUCCESS};

pub fn run(args: VersionArgs) -> CliResult<i32> {
    if !args.extended {
        println!("dapwire {}", env!("CARGO_PKG_VERSION"));
        return Ok(SUCCESS);
    }

    println!("name: dapwire");
    println!("version: {}", env!("CARGO_PKG_VERSION"));
    println!(
        "target: {}",
        option_env!("DAPWIRE_BUILD_TARGET").unwrap_or("unknown")
    );
    println!("target_os: {}", std::env::consts::OS);
    println!("target_arch: {}", std::env::consts::ARCH);
    println!("git_hash: {}", option_env!("GIT_HASH").unwrap_or("unknown"));
    println!(
        "features: adapter={}, async={}, cli=true",
        cfg!(feature = "adapter"),
        cfg!(feature = "async")
    );
    println!(
        "limits: max_content_length={}, max_header_size={}",
        dapwire_frame::DEFAULT_MAX_CONTENT_LENGTH,
        dapwire_frame::DEFAULT_MAX_HEADER_SIZE
    );

    Ok(SUCCESS)
}
