use crate::cmd::{connect_driver, ConnectionArgs, QueryArgs};
use crate::exit::{driver_error, CliResult, SUCCESS};
use crate::output::{print_reply, OutputFormat};

pub fn run(args: QueryArgs, conn: &ConnectionArgs, format: OutputFormat) -> CliResult<i32> {
    let mut driver = connect_driver(conn)?;
    let reply = driver
        .query(&args.command)
        .map_err(|err| driver_error("query failed", err))?;
    driver.disconnect();

    print_reply(&args.command, &reply, format);
    Ok(SUCCESS)
}
