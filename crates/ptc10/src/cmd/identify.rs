use ptc10_line::IDENTIFY;

use crate::cmd::{connect_driver, ConnectionArgs};
use crate::exit::{driver_error, CliResult, SUCCESS};
use crate::output::{print_reply, OutputFormat};

pub fn run(conn: &ConnectionArgs, format: OutputFormat) -> CliResult<i32> {
    let mut driver = connect_driver(conn)?;
    let id = driver
        .identify()
        .map_err(|err| driver_error("identify failed", err))?;
    driver.disconnect();

    print_reply(IDENTIFY, &id, format);
    Ok(SUCCESS)
}
