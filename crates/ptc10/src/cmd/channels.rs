use crate::cmd::{connect_driver, ConnectionArgs};
use crate::exit::{driver_error, CliResult, SUCCESS};
use crate::output::{print_names, print_outputs, print_values, OutputFormat};

pub fn names(conn: &ConnectionArgs, format: OutputFormat) -> CliResult<i32> {
    let mut driver = connect_driver(conn)?;
    let names = driver
        .get_channel_names()
        .map_err(|err| driver_error("reading channel names failed", err))?;
    driver.disconnect();

    print_names(&names, format);
    Ok(SUCCESS)
}

pub fn values(conn: &ConnectionArgs, format: OutputFormat) -> CliResult<i32> {
    let mut driver = connect_driver(conn)?;
    let values = driver
        .get_all_values()
        .map_err(|err| driver_error("reading values failed", err))?;
    driver.disconnect();

    print_values(&values, format);
    Ok(SUCCESS)
}

pub fn outputs(conn: &ConnectionArgs, format: OutputFormat) -> CliResult<i32> {
    let mut driver = connect_driver(conn)?;
    let outputs = driver
        .get_named_output_dict()
        .map_err(|err| driver_error("reading outputs failed", err))?;
    driver.disconnect();

    print_outputs(&outputs, format);
    Ok(SUCCESS)
}
